//! The live-object binding registry.
//!
//! Maps [`Guid`]s to currently-live object handles and tells watchers when
//! a binding appears or disappears. Population is push-only: the owner of a
//! live object registers it at creation and unregisters it at destruction.
//! Resolving a guid that nothing has registered returns `None`; that is a
//! normal outcome, not an error.
//!
//! All dispatch is synchronous on the host's single interactive thread.
//! There is no queued delivery: callbacks run inside the `register` /
//! `unregister` call that triggered them. The one ordering guarantee is
//! that replacing a binding delivers "removed" for the old handle strictly
//! before "added" for the new one.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::guid::Guid;

/// How a second registration for an already-bound guid is resolved.
///
/// The conflict is reported either way; neither policy is fatal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
	/// Overwrite with the most recent registration.
	#[default]
	LastWins,
	/// Keep the existing binding and drop the incoming one.
	FirstWins,
}

/// Outcome of a [`GuidRegistry::register`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
	/// The guid was unbound; a fresh binding was created.
	Bound,
	/// An existing binding was displaced (`LastWins`).
	Replaced,
	/// The existing binding was kept (`FirstWins`).
	Rejected,
}

impl RegisterOutcome {
	/// Returns true if the registration collided with an existing binding.
	pub fn is_conflict(self) -> bool {
		!matches!(self, RegisterOutcome::Bound)
	}
}

struct Watcher<H> {
	token: u64,
	on_added: Box<dyn FnMut(&H)>,
	on_removed: Box<dyn FnMut()>,
}

struct Inner<H> {
	policy: DuplicatePolicy,
	bindings: FxHashMap<Guid, H>,
	watchers: FxHashMap<Guid, Vec<Watcher<H>>>,
	/// Tokens of guards dropped while their watcher was detached for
	/// dispatch; discarded when the watcher list is restored.
	dead: FxHashSet<u64>,
	next_token: u64,
}

/// Process-wide map from [`Guid`] to live object handle.
///
/// Cheap to clone; clones share the same binding table. The registry is a
/// plain value with no implicit global instance, injected by reference into
/// everything that resolves through it.
pub struct GuidRegistry<H> {
	inner: Rc<RefCell<Inner<H>>>,
}

impl<H> Clone for GuidRegistry<H> {
	fn clone(&self) -> Self {
		Self { inner: Rc::clone(&self.inner) }
	}
}

impl<H> Default for GuidRegistry<H> {
	fn default() -> Self {
		Self::new()
	}
}

impl<H> fmt::Debug for GuidRegistry<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let inner = self.inner.borrow();
		f.debug_struct("GuidRegistry")
			.field("policy", &inner.policy)
			.field("bindings", &inner.bindings.len())
			.field("watched_guids", &inner.watchers.len())
			.finish()
	}
}

impl<H> GuidRegistry<H> {
	/// Creates an empty registry with the default `LastWins` policy.
	pub fn new() -> Self {
		Self::with_policy(DuplicatePolicy::default())
	}

	/// Creates an empty registry with an explicit duplicate policy.
	pub fn with_policy(policy: DuplicatePolicy) -> Self {
		Self {
			inner: Rc::new(RefCell::new(Inner {
				policy,
				bindings: FxHashMap::default(),
				watchers: FxHashMap::default(),
				dead: FxHashSet::default(),
				next_token: 0,
			})),
		}
	}

	/// The duplicate-registration policy this registry was built with.
	pub fn policy(&self) -> DuplicatePolicy {
		self.inner.borrow().policy
	}

	/// Number of currently-bound guids.
	pub fn len(&self) -> usize {
		self.inner.borrow().bindings.len()
	}

	/// Returns true if no guid is currently bound.
	pub fn is_empty(&self) -> bool {
		self.inner.borrow().bindings.is_empty()
	}

	/// Returns true if `guid` is currently bound.
	pub fn contains(&self, guid: Guid) -> bool {
		self.inner.borrow().bindings.contains_key(&guid)
	}
}

impl<H: Clone> GuidRegistry<H> {
	/// Returns the current handle for `guid` without installing a watcher.
	pub fn get(&self, guid: Guid) -> Option<H> {
		self.inner.borrow().bindings.get(&guid).cloned()
	}

	/// Binds `guid` to `handle`.
	///
	/// If the guid is already bound the call is a conflict, arbitrated by
	/// the registry's [`DuplicatePolicy`]. A replacement delivers "removed"
	/// for the displaced handle to every watcher of the guid before
	/// delivering "added" for the new one.
	pub fn register(&self, guid: Guid, handle: H) -> RegisterOutcome {
		let displaced = {
			let mut inner = self.inner.borrow_mut();
			if inner.bindings.contains_key(&guid) {
				match inner.policy {
					DuplicatePolicy::FirstWins => {
						tracing::warn!(%guid, "duplicate registration rejected, existing binding kept");
						return RegisterOutcome::Rejected;
					}
					DuplicatePolicy::LastWins => {
						tracing::warn!(%guid, "duplicate registration, replacing existing binding");
					}
				}
			}
			inner.bindings.insert(guid, handle.clone())
		};
		if displaced.is_some() {
			self.notify_removed(guid);
		} else {
			tracing::debug!(%guid, "binding added");
		}
		self.notify_added(guid, &handle);
		if displaced.is_some() {
			RegisterOutcome::Replaced
		} else {
			RegisterOutcome::Bound
		}
	}

	/// Removes the binding for `guid` if present, notifying watchers.
	///
	/// A no-op for guids that were never bound.
	pub fn unregister(&self, guid: Guid) {
		let removed = self.inner.borrow_mut().bindings.remove(&guid);
		if removed.is_some() {
			tracing::debug!(%guid, "binding removed");
			self.notify_removed(guid);
		}
	}

	/// Returns the current handle for `guid`, if bound, and installs the
	/// two callbacks as a watcher for future add/remove of that guid.
	///
	/// The watcher is installed regardless of the current binding state, so
	/// a caller that resolves "absent" still hears about the object the
	/// moment it later registers. Delivery stops when the returned
	/// [`WatchGuard`] is dropped or cancelled.
	pub fn resolve(
		&self,
		guid: Guid,
		on_added: impl FnMut(&H) + 'static,
		on_removed: impl FnMut() + 'static,
	) -> (Option<H>, WatchGuard<H>) {
		let mut inner = self.inner.borrow_mut();
		let token = inner.next_token;
		inner.next_token += 1;
		inner.watchers.entry(guid).or_default().push(Watcher {
			token,
			on_added: Box::new(on_added),
			on_removed: Box::new(on_removed),
		});
		let current = inner.bindings.get(&guid).cloned();
		drop(inner);
		let guard = WatchGuard {
			inner: Rc::downgrade(&self.inner),
			guid,
			token,
		};
		(current, guard)
	}

	fn notify_added(&self, guid: Guid, handle: &H) {
		let mut taken = self.take_watchers(guid);
		for watcher in &mut taken {
			(watcher.on_added)(handle);
		}
		self.restore_watchers(guid, taken);
	}

	fn notify_removed(&self, guid: Guid) {
		let mut taken = self.take_watchers(guid);
		for watcher in &mut taken {
			(watcher.on_removed)();
		}
		self.restore_watchers(guid, taken);
	}

	// Watchers are detached from the table while their callbacks run so the
	// callbacks may re-enter the registry (resolve, register, guard drops).
	fn take_watchers(&self, guid: Guid) -> Vec<Watcher<H>> {
		self.inner
			.borrow_mut()
			.watchers
			.remove(&guid)
			.unwrap_or_default()
	}

	fn restore_watchers(&self, guid: Guid, mut taken: Vec<Watcher<H>>) {
		let mut inner = self.inner.borrow_mut();
		if !inner.dead.is_empty() {
			// Guards dropped mid-dispatch marked their watcher dead while it
			// was detached; drop those entries instead of resurrecting them.
			let Inner { dead, .. } = &mut *inner;
			taken.retain(|watcher| !dead.remove(&watcher.token));
		}
		if taken.is_empty() {
			return;
		}
		// Watchers installed during dispatch land behind the detached ones,
		// preserving overall registration order.
		let slot = inner.watchers.entry(guid).or_default();
		let mut newer = std::mem::take(slot);
		taken.append(&mut newer);
		*slot = taken;
	}
}

/// Keeps a watcher registration alive; dropping it cancels delivery.
///
/// Holds only a weak link back to the registry, so a guard outliving the
/// registry is harmless.
pub struct WatchGuard<H> {
	inner: Weak<RefCell<Inner<H>>>,
	guid: Guid,
	token: u64,
}

impl<H> WatchGuard<H> {
	/// The guid this guard's watcher observes.
	pub fn guid(&self) -> Guid {
		self.guid
	}

	/// Cancels the watcher registration now.
	pub fn cancel(self) {}
}

impl<H> fmt::Debug for WatchGuard<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WatchGuard")
			.field("guid", &self.guid)
			.field("token", &self.token)
			.finish()
	}
}

impl<H> Drop for WatchGuard<H> {
	fn drop(&mut self) {
		let Some(inner) = self.inner.upgrade() else {
			return;
		};
		let mut inner = inner.borrow_mut();
		let found = match inner.watchers.get_mut(&self.guid) {
			Some(list) => {
				let before = list.len();
				list.retain(|watcher| watcher.token != self.token);
				list.len() != before
			}
			None => false,
		};
		if found {
			if inner.watchers.get(&self.guid).is_some_and(Vec::is_empty) {
				inner.watchers.remove(&self.guid);
			}
		} else {
			// The watcher is detached for dispatch right now; mark it dead
			// so the restore pass discards it.
			inner.dead.insert(self.token);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;

	fn counting_watch(
		registry: &GuidRegistry<u32>,
		guid: Guid,
	) -> (Option<u32>, WatchGuard<u32>, Rc<RefCell<Vec<Option<u32>>>>) {
		let log = Rc::new(RefCell::new(Vec::new()));
		let added_log = Rc::clone(&log);
		let removed_log = Rc::clone(&log);
		let (current, guard) = registry.resolve(
			guid,
			move |handle: &u32| added_log.borrow_mut().push(Some(*handle)),
			move || removed_log.borrow_mut().push(None),
		);
		(current, guard, log)
	}

	#[test]
	fn register_then_resolve_returns_handle() {
		let registry = GuidRegistry::new();
		let guid = Guid::random();
		assert_eq!(registry.register(guid, 1), RegisterOutcome::Bound);
		let (current, _guard, _log) = counting_watch(&registry, guid);
		assert_eq!(current, Some(1));
	}

	#[test]
	fn lifecycle_rebind_sequence() {
		// register A1 -> H1, resolve H1, unregister, resolve absent,
		// register A1 -> H2, resolve H2.
		let registry = GuidRegistry::new();
		let a1 = Guid::random();
		registry.register(a1, 1);
		assert_eq!(registry.get(a1), Some(1));
		registry.unregister(a1);
		assert_eq!(registry.get(a1), None);
		registry.register(a1, 2);
		assert_eq!(registry.get(a1), Some(2));
	}

	#[test]
	fn watcher_before_registration_fires_added_once() {
		let registry = GuidRegistry::new();
		let guid = Guid::random();
		let (current, _guard, log) = counting_watch(&registry, guid);
		assert_eq!(current, None);
		registry.register(guid, 7);
		assert_eq!(*log.borrow(), vec![Some(7)]);
	}

	#[test]
	fn replacement_delivers_removed_before_added() {
		let registry = GuidRegistry::new();
		let guid = Guid::random();
		registry.register(guid, 1);
		let (_, _guard, log) = counting_watch(&registry, guid);
		assert_eq!(registry.register(guid, 2), RegisterOutcome::Replaced);
		assert_eq!(*log.borrow(), vec![None, Some(2)]);
	}

	#[test]
	fn first_wins_policy_rejects() {
		let registry = GuidRegistry::with_policy(DuplicatePolicy::FirstWins);
		let guid = Guid::random();
		registry.register(guid, 1);
		assert_eq!(registry.register(guid, 2), RegisterOutcome::Rejected);
		assert_eq!(registry.get(guid), Some(1));
	}

	#[test]
	fn unregister_unknown_guid_is_noop() {
		let registry = GuidRegistry::<u32>::new();
		registry.unregister(Guid::random());
		assert!(registry.is_empty());
	}

	#[test]
	fn dropped_guard_stops_delivery() {
		let registry = GuidRegistry::new();
		let guid = Guid::random();
		let (_, guard, log) = counting_watch(&registry, guid);
		drop(guard);
		registry.register(guid, 3);
		assert!(log.borrow().is_empty());
	}

	#[test]
	fn guard_dropped_inside_callback_is_honored() {
		let registry = GuidRegistry::new();
		let guid = Guid::random();
		// First watcher drops the second watcher's guard mid-dispatch.
		let parked: Rc<RefCell<Option<WatchGuard<u32>>>> = Rc::new(RefCell::new(None));
		let parked_in_cb = Rc::clone(&parked);
		let (_, _first) = registry.resolve(
			guid,
			move |_: &u32| {
				parked_in_cb.borrow_mut().take();
			},
			|| {},
		);
		let (_, second, log) = counting_watch(&registry, guid);
		*parked.borrow_mut() = Some(second);
		registry.register(guid, 1);
		// The second watcher still saw this first registration (it was
		// detached together with the first when dispatch began), but it
		// must not survive into the next one.
		registry.register(guid, 2);
		assert_eq!(*log.borrow(), vec![Some(1)]);
	}

	#[test]
	fn watcher_installed_during_dispatch_sees_later_events() {
		let registry: GuidRegistry<u32> = GuidRegistry::new();
		let guid = Guid::random();
		let log = Rc::new(RefCell::new(Vec::new()));
		let late_log = Rc::clone(&log);
		let reg2 = registry.clone();
		let installed: Rc<RefCell<Option<WatchGuard<u32>>>> = Rc::new(RefCell::new(None));
		let installed_in_cb = Rc::clone(&installed);
		let (_, _outer) = registry.resolve(
			guid,
			move |_: &u32| {
				if installed_in_cb.borrow().is_some() {
					return;
				}
				let inner_log = Rc::clone(&late_log);
				let (_, guard) =
					reg2.resolve(guid, move |h: &u32| inner_log.borrow_mut().push(*h), || {});
				*installed_in_cb.borrow_mut() = Some(guard);
			},
			|| {},
		);
		registry.register(guid, 1);
		registry.unregister(guid);
		registry.register(guid, 2);
		// The nested watcher was installed during the first dispatch and
		// only hears events after it.
		assert_eq!(*log.borrow(), vec![2]);
	}

	#[test]
	fn get_does_not_install_watcher() {
		let registry = GuidRegistry::new();
		let guid = Guid::random();
		assert_eq!(registry.get(guid), None);
		registry.register(guid, 1);
		assert_eq!(registry.get(guid), Some(1));
	}
}
