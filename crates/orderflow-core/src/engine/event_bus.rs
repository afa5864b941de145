//! Broadcast bus carrying lifecycle events to the notification loop.
//!
//! Publishing never blocks the transition path. When no subscriber is
//! listening the send fails, which callers treat as a no-op; events are
//! advisory and carry no state of their own.

use orderflow_types::OrderEvent;
use tokio::sync::broadcast;

/// Event bus for inter-component communication.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<OrderEvent>,
}

impl EventBus {
	/// Creates a bus buffering up to `capacity` undelivered events per
	/// subscriber. Slow subscribers skip over what they missed.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to all current subscribers. Returns how many
	/// subscribers received it.
	pub fn publish(
		&self,
		event: OrderEvent,
	) -> Result<usize, broadcast::error::SendError<OrderEvent>> {
		self.sender.send(event)
	}

	/// Opens a new subscription starting at the next published event.
	pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
		self.sender.subscribe()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use orderflow_types::OrderStatus;

	#[tokio::test]
	async fn delivers_to_all_subscribers() {
		let bus = EventBus::new(16);
		let mut first = bus.subscribe();
		let mut second = bus.subscribe();

		let order = crate::engine::support::sample_order(OrderStatus::Pending);
		bus.publish(OrderEvent::Created {
			order: order.clone(),
		})
		.unwrap();

		for receiver in [&mut first, &mut second] {
			match receiver.recv().await.unwrap() {
				OrderEvent::Created { order: received } => {
					assert_eq!(received.id, order.id);
				}
				other => panic!("expected Created, got {other:?}"),
			}
		}
	}

	#[test]
	fn publish_without_subscribers_is_an_error_not_a_panic() {
		let bus = EventBus::new(4);
		let order = crate::engine::support::sample_order(OrderStatus::Pending);
		assert!(bus.publish(OrderEvent::Created { order }).is_err());
	}
}
