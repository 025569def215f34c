//! Synchronous observer lists and deferred event buffers.
//!
//! A [`Signal`] calls every listener in-line, in subscription order. Listeners only
//! see the event value, never the collection that raised it, so a listener can not
//! mutate what is being iterated. Reactions that do need to mutate the scene are
//! queued in an [`EventQueue`] and applied once the current pass is over.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct Signal<E> {
	next_id: u64,
	listeners: Vec<(SubscriptionId, Box<dyn FnMut(&E)>)>,
}

impl<E> Signal<E> {
	pub fn new() -> Self {
		Self {
			next_id: 0,
			listeners: Vec::new(),
		}
	}

	pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> SubscriptionId {
		let id = SubscriptionId(self.next_id);
		self.next_id += 1;
		self.listeners.push((id, Box::new(listener)));
		id
	}

	/// Returns `false` if nothing was subscribed under `id`.
	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		let len = self.listeners.len();
		self.listeners.retain(|(sub, _)| *sub != id);
		self.listeners.len() != len
	}

	pub fn emit(&mut self, event: &E) {
		for (_, listener) in self.listeners.iter_mut() {
			listener(event);
		}
	}

	pub fn len(&self) -> usize {
		self.listeners.len()
	}

	pub fn is_empty(&self) -> bool {
		self.listeners.is_empty()
	}
}

impl<E> Default for Signal<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E> fmt::Debug for Signal<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal").field("listeners", &self.listeners.len()).finish()
	}
}

/// Events collected during a pass and drained at a known point afterwards.
#[derive(Debug)]
pub struct EventQueue<T> {
	events: Vec<T>,
}

impl<T> EventQueue<T> {
	pub fn new() -> Self {
		Self { events: Vec::new() }
	}

	pub fn send(&mut self, event: T) {
		self.events.push(event);
	}

	pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
		self.events.drain(..)
	}

	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}

	pub fn len(&self) -> usize {
		self.events.len()
	}
}

impl<T> Default for EventQueue<T> {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;

	#[test]
	fn listeners_run_in_subscription_order() {
		let log = Rc::new(RefCell::new(Vec::new()));
		let mut signal = Signal::<u32>::new();

		let first = Rc::clone(&log);
		signal.subscribe(move |e| first.borrow_mut().push(("first", *e)));
		let second = Rc::clone(&log);
		signal.subscribe(move |e| second.borrow_mut().push(("second", *e)));

		signal.emit(&7);
		assert_eq!(*log.borrow(), vec![("first", 7), ("second", 7)]);
	}

	#[test]
	fn unsubscribed_listener_is_not_called() {
		let hits = Rc::new(RefCell::new(0));
		let mut signal = Signal::<()>::default();

		let counter = Rc::clone(&hits);
		let id = signal.subscribe(move |_| *counter.borrow_mut() += 1);
		signal.emit(&());
		assert!(signal.unsubscribe(id));
		assert!(!signal.unsubscribe(id));
		signal.emit(&());

		assert_eq!(*hits.borrow(), 1);
		assert!(signal.is_empty());
	}

	#[test]
	fn queue_drains_in_order() {
		let mut queue = EventQueue::new();
		queue.send(1);
		queue.send(2);
		assert_eq!(queue.len(), 2);
		assert_eq!(queue.drain().collect::<Vec<_>>(), vec![1, 2]);
		assert!(queue.is_empty());
	}
}
