//! The instance store and its lock discipline.

use crate::{BindOutcome, Match, OperationStart, UpdateOutcome};
use osb_core::BrokerError;
use osb_types::{
    BindingId, BindingRecord, InstanceId, InstanceRecord, OperationKey, OperationRecord,
    OperationState, Parameters, PlanId, ServiceId,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Everything guarded by the store lock.
#[derive(Debug, Default)]
struct StoreState {
    /// instance_id -> record
    instances: HashMap<InstanceId, InstanceRecord>,

    /// (instance_id, binding_id) -> record
    bindings: HashMap<(InstanceId, BindingId), BindingRecord>,

    /// Last operation per instance.
    instance_operations: HashMap<InstanceId, OperationRecord>,

    /// Last operation per binding.
    binding_operations: HashMap<(InstanceId, BindingId), OperationRecord>,

    /// Next operation key to hand out.
    next_operation: u64,
}

impl StoreState {
    fn next_key(&mut self) -> OperationKey {
        self.next_operation += 1;
        OperationKey(self.next_operation)
    }

    /// Key of the instance's operation if it is still in progress.
    fn pending_instance_operation(&self, instance_id: &InstanceId) -> Option<OperationKey> {
        self.instance_operations
            .get(instance_id)
            .filter(|op| !op.state.is_terminal())
            .map(|op| op.key)
    }

    /// Open an operation on an instance.
    ///
    /// An operation still in progress is never replaced; its key is returned
    /// instead and the new operation folds into it.
    fn open_instance_operation(
        &mut self,
        instance_id: &InstanceId,
        start: OperationStart,
    ) -> OperationKey {
        if let Some(pending) = self.pending_instance_operation(instance_id) {
            debug!(instance_id = %instance_id, operation = %pending, "Joined pending operation");
            return pending;
        }
        let key = self.next_key();
        self.instance_operations.insert(
            instance_id.clone(),
            OperationRecord::new(key, start.kind, start.state),
        );
        key
    }

    fn operation_mut(&mut self, key: OperationKey) -> Option<&mut OperationRecord> {
        self.instance_operations
            .values_mut()
            .chain(self.binding_operations.values_mut())
            .find(|op| op.key == key)
    }
}

/// Concurrency-safe store of instances, bindings and operation records.
///
/// The store is the only writer of broker state. Callers get clones, never
/// references into the map.
#[derive(Debug, Default)]
pub struct InstanceStore {
    state: RwLock<StoreState>,
}

impl InstanceStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Instances
    // ═══════════════════════════════════════════════════════════════════════

    /// Get a copy of the record stored under `id`.
    pub fn get(&self, id: &InstanceId) -> Result<InstanceRecord, BrokerError> {
        self.state
            .read()
            .instances
            .get(id)
            .cloned()
            .ok_or_else(|| BrokerError::instance_not_found(id))
    }

    /// Check whether a record exists under `id`.
    pub fn contains(&self, id: &InstanceId) -> bool {
        self.state.read().instances.contains_key(id)
    }

    /// Insert a record. Fails with `Conflict` if any record exists for its id.
    pub fn insert(&self, record: InstanceRecord) -> Result<(), BrokerError> {
        let mut state = self.state.write();
        if state.instances.contains_key(&record.id) {
            return Err(BrokerError::instance_conflict(&record.id));
        }
        debug!(instance_id = %record.id, "Inserted instance");
        state.instances.insert(record.id.clone(), record);
        Ok(())
    }

    /// Remove the record under `id`, together with its bindings and
    /// operation records.
    ///
    /// Removing an absent id is not an error; `None` is returned.
    pub fn remove(&self, id: &InstanceId) -> Option<InstanceRecord> {
        let mut state = self.state.write();
        let removed = state.instances.remove(id);
        state.instance_operations.remove(id);

        let before = state.bindings.len();
        state.bindings.retain(|(instance_id, _), _| instance_id != id);
        state
            .binding_operations
            .retain(|(instance_id, _), _| instance_id != id);
        let bindings_removed = before - state.bindings.len();

        if removed.is_some() {
            debug!(instance_id = %id, bindings_removed, "Removed instance");
        }
        removed
    }

    /// Compare `candidate` against the record stored under its id.
    pub fn compare(&self, candidate: &InstanceRecord) -> Match {
        match self.state.read().instances.get(&candidate.id) {
            None => Match::Absent,
            Some(existing) if existing.matches(candidate) => Match::Equivalent,
            Some(_) => Match::Conflicting,
        }
    }

    /// Compare `candidate` and insert it if absent, in one critical section.
    ///
    /// When the candidate is inserted and `operation` is given, an operation
    /// record is opened for the new instance and its key returned. For an
    /// equivalent record the key of its in-progress operation, if any, is
    /// returned so retries can keep polling it.
    pub fn compare_and_insert(
        &self,
        candidate: InstanceRecord,
        operation: Option<OperationStart>,
    ) -> (Match, Option<OperationKey>) {
        let mut state = self.state.write();

        if let Some(existing) = state.instances.get(&candidate.id) {
            if existing.matches(&candidate) {
                return (
                    Match::Equivalent,
                    state.pending_instance_operation(&candidate.id),
                );
            }
            return (Match::Conflicting, None);
        }

        let key = operation.map(|start| state.open_instance_operation(&candidate.id, start));
        debug!(instance_id = %candidate.id, plan_id = %candidate.plan_id, "Inserted instance");
        state.instances.insert(candidate.id.clone(), candidate);
        (Match::Absent, key)
    }

    /// Replace plan and/or parameters of an existing record.
    ///
    /// `service_id` must equal the stored one. Fields passed as `None` keep
    /// their stored value.
    pub fn update(
        &self,
        id: &InstanceId,
        service_id: &ServiceId,
        plan_id: Option<PlanId>,
        parameters: Option<Parameters>,
        operation: Option<OperationStart>,
    ) -> UpdateOutcome {
        let mut state = self.state.write();

        let Some(existing) = state.instances.get_mut(id) else {
            return UpdateOutcome::InstanceMissing;
        };
        if &existing.service_id != service_id {
            return UpdateOutcome::ServiceMismatch;
        }

        let previous = existing.clone();
        if let Some(plan_id) = plan_id {
            existing.plan_id = plan_id;
        }
        if let Some(parameters) = parameters {
            existing.parameters = parameters;
        }
        let current = existing.clone();

        let operation = operation.map(|start| state.open_instance_operation(id, start));
        debug!(
            instance_id = %id,
            old_plan = %previous.plan_id,
            new_plan = %current.plan_id,
            "Updated instance"
        );
        UpdateOutcome::Updated {
            previous,
            current,
            operation,
        }
    }

    /// Number of stored instances.
    pub fn len(&self) -> usize {
        self.state.read().instances.len()
    }

    /// Whether the store holds no instances.
    pub fn is_empty(&self) -> bool {
        self.state.read().instances.is_empty()
    }

    /// Ids of all stored instances, sorted.
    pub fn instance_ids(&self) -> Vec<InstanceId> {
        let mut ids: Vec<_> = self.state.read().instances.keys().cloned().collect();
        ids.sort();
        ids
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Bindings
    // ═══════════════════════════════════════════════════════════════════════

    /// Create a binding for an existing instance.
    ///
    /// The instance lookup and the binding insertion happen in one critical
    /// section, so a concurrent `remove` can never leave an orphaned binding.
    /// The new binding's credentials are the instance's parameters.
    pub fn bind(
        &self,
        instance_id: &InstanceId,
        binding_id: &BindingId,
        parameters: Parameters,
        operation: Option<OperationStart>,
    ) -> BindOutcome {
        let mut state = self.state.write();

        let Some(instance) = state.instances.get(instance_id) else {
            return BindOutcome::InstanceMissing;
        };
        let candidate = BindingRecord::new(
            instance_id.clone(),
            binding_id.clone(),
            parameters,
            instance.parameters.clone(),
        );

        let key = candidate.key();
        if let Some(existing) = state.bindings.get(&key) {
            if existing.matches(&candidate) {
                return BindOutcome::Equivalent(existing.clone());
            }
            return BindOutcome::Conflicting;
        }

        let operation = operation.map(|start| {
            let op_key = state.next_key();
            state.binding_operations.insert(
                key.clone(),
                OperationRecord::new(op_key, start.kind, start.state),
            );
            op_key
        });
        debug!(instance_id = %instance_id, binding_id = %binding_id, "Created binding");
        state.bindings.insert(key, candidate.clone());

        BindOutcome::Created {
            binding: candidate,
            operation,
        }
    }

    /// Get a copy of a binding.
    pub fn get_binding(
        &self,
        instance_id: &InstanceId,
        binding_id: &BindingId,
    ) -> Option<BindingRecord> {
        self.state
            .read()
            .bindings
            .get(&(instance_id.clone(), binding_id.clone()))
            .cloned()
    }

    /// Remove a binding. Removing an absent binding returns `None`.
    pub fn unbind(&self, instance_id: &InstanceId, binding_id: &BindingId) -> Option<BindingRecord> {
        let key = (instance_id.clone(), binding_id.clone());
        let mut state = self.state.write();
        state.binding_operations.remove(&key);
        state.bindings.remove(&key)
    }

    /// Number of bindings held for an instance.
    pub fn binding_count(&self, instance_id: &InstanceId) -> usize {
        self.state
            .read()
            .bindings
            .keys()
            .filter(|(id, _)| id == instance_id)
            .count()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Operations
    // ═══════════════════════════════════════════════════════════════════════

    /// Open an operation record on an existing instance.
    ///
    /// Returns `None` if the instance does not exist. If the instance has an
    /// operation in progress, that operation's key is returned and nothing
    /// new is recorded.
    pub fn record_operation(
        &self,
        instance_id: &InstanceId,
        start: OperationStart,
    ) -> Option<OperationKey> {
        let mut state = self.state.write();
        if !state.instances.contains_key(instance_id) {
            return None;
        }
        Some(state.open_instance_operation(instance_id, start))
    }

    /// Get the last operation of an existing instance.
    ///
    /// Fails with `NotFound` if the instance does not exist; returns
    /// `Ok(None)` if no operation was ever recorded for it.
    pub fn last_operation(
        &self,
        instance_id: &InstanceId,
    ) -> Result<Option<OperationRecord>, BrokerError> {
        let state = self.state.read();
        if !state.instances.contains_key(instance_id) {
            return Err(BrokerError::instance_not_found(instance_id));
        }
        Ok(state.instance_operations.get(instance_id).cloned())
    }

    /// Get the last operation of a binding, if any was recorded.
    pub fn binding_last_operation(
        &self,
        instance_id: &InstanceId,
        binding_id: &BindingId,
    ) -> Option<OperationRecord> {
        self.state
            .read()
            .binding_operations
            .get(&(instance_id.clone(), binding_id.clone()))
            .cloned()
    }

    /// Move an in-progress operation to a terminal state.
    ///
    /// Returns `false` if no in-progress operation has this key.
    pub fn complete_operation(
        &self,
        key: OperationKey,
        state: OperationState,
        description: Option<String>,
    ) -> bool {
        let mut guard = self.state.write();
        let completed = guard
            .operation_mut(key)
            .is_some_and(|op| op.complete(state, description));
        if completed {
            info!(operation = %key, state = %state, "Operation completed");
        }
        completed
    }

    /// Keys of all in-progress operations.
    pub fn pending_operations(&self) -> Vec<OperationKey> {
        let state = self.state.read();
        let mut keys: Vec<_> = state
            .instance_operations
            .values()
            .chain(state.binding_operations.values())
            .filter(|op| !op.state.is_terminal())
            .map(|op| op.key)
            .collect();
        keys.sort();
        keys
    }

    /// Mark every in-progress operation older than `min_age` as succeeded.
    ///
    /// Returns the keys that were completed.
    pub fn complete_expired(&self, min_age: Duration) -> Vec<OperationKey> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let mut completed: Vec<_> = state
            .instance_operations
            .values_mut()
            .chain(state.binding_operations.values_mut())
            .filter(|op| !op.state.is_terminal() && op.started_at.elapsed() >= min_age)
            .filter_map(|op| {
                op.complete(OperationState::Succeeded, None)
                    .then_some(op.key)
            })
            .collect();
        completed.sort();
        if !completed.is_empty() {
            debug!(count = completed.len(), "Completed expired operations");
        }
        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osb_test_helpers::{params, test_instance};
    use osb_types::OperationKind;
    use rayon::prelude::*;
    use serde_json::json;
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn in_progress(kind: OperationKind) -> Option<OperationStart> {
        Some(OperationStart::new(kind, OperationState::InProgress))
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = InstanceStore::new();
        let err = store.get(&InstanceId::from("nope")).unwrap_err();
        assert!(matches!(err, BrokerError::NotFound(_)));
    }

    #[test]
    fn test_insert_then_get() {
        let store = InstanceStore::new();
        let record = test_instance("i-1", json!({"color": "Grey"}));
        store.insert(record.clone()).unwrap();

        assert_eq!(store.get(&record.id).unwrap(), record);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insert_twice_conflicts() {
        let store = InstanceStore::new();
        let record = test_instance("i-1", json!({}));
        store.insert(record.clone()).unwrap();

        let err = store.insert(record).unwrap_err();
        assert!(matches!(err, BrokerError::Conflict(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = InstanceStore::new();
        let id = InstanceId::from("i-1");
        assert!(store.remove(&id).is_none());

        store.insert(test_instance("i-1", json!({}))).unwrap();
        assert!(store.remove(&id).is_some());
        assert!(store.remove(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_compare_outcomes() {
        let store = InstanceStore::new();
        let grey = test_instance("i-1", json!({"color": "Grey"}));
        let beige = test_instance("i-1", json!({"color": "Beige"}));

        assert_eq!(store.compare(&grey), Match::Absent);
        store.insert(grey.clone()).unwrap();
        assert_eq!(store.compare(&grey), Match::Equivalent);
        assert_eq!(store.compare(&beige), Match::Conflicting);
    }

    #[test]
    fn test_compare_and_insert_keeps_first_record() {
        let store = InstanceStore::new();
        let grey = test_instance("i-1", json!({"color": "Grey"}));
        let beige = test_instance("i-1", json!({"color": "Beige"}));

        assert_eq!(store.compare_and_insert(grey.clone(), None).0, Match::Absent);
        assert_eq!(store.compare_and_insert(grey.clone(), None).0, Match::Equivalent);
        assert_eq!(store.compare_and_insert(beige, None).0, Match::Conflicting);

        assert_eq!(store.get(&grey.id).unwrap(), grey);
    }

    #[test]
    fn test_compare_and_insert_opens_operation_only_on_insert() {
        let store = InstanceStore::new();
        let record = test_instance("i-1", json!({}));

        let (_, key) = store.compare_and_insert(record.clone(), in_progress(OperationKind::Provision));
        let key = key.expect("operation opened on insert");

        let (matched, again) =
            store.compare_and_insert(record.clone(), in_progress(OperationKind::Provision));
        assert_eq!(matched, Match::Equivalent);
        assert_eq!(again, Some(key));
        assert_eq!(store.pending_operations(), vec![key]);

        let op = store.last_operation(&record.id).unwrap().unwrap();
        assert_eq!(op.key, key);
        assert_eq!(op.state, OperationState::InProgress);
    }

    #[test]
    fn test_concurrent_compare_and_insert_single_winner() {
        let store = Arc::new(InstanceStore::new());
        let record = test_instance("shared", json!({"color": "Grey"}));

        let outcomes: Vec<Match> = (0..64)
            .into_par_iter()
            .map(|_| store.compare_and_insert(record.clone(), None).0)
            .collect();

        let inserted = outcomes.iter().filter(|m| **m == Match::Absent).count();
        let equivalent = outcomes.iter().filter(|m| **m == Match::Equivalent).count();
        assert_eq!(inserted, 1);
        assert_eq!(equivalent, 63);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_concurrent_conflicting_inserts_keep_one_record() {
        let store = Arc::new(InstanceStore::new());

        let outcomes: Vec<(u64, Match)> = (0..32u64)
            .into_par_iter()
            .map(|n| {
                let record = test_instance("shared", json!({ "n": n }));
                (n, store.compare_and_insert(record, None).0)
            })
            .collect();

        let winners: Vec<_> = outcomes
            .iter()
            .filter(|(_, m)| *m == Match::Absent)
            .collect();
        assert_eq!(winners.len(), 1);

        // The stored record is the winner's
        let stored = store.get(&InstanceId::from("shared")).unwrap();
        assert_eq!(stored.parameters, params(json!({ "n": winners[0].0 })));
    }

    #[test]
    fn test_update_replaces_fields() {
        let store = InstanceStore::new();
        let record = test_instance("i-1", json!({"color": "Grey"}));
        store.insert(record.clone()).unwrap();

        let outcome = store.update(
            &record.id,
            &record.service_id,
            Some(PlanId::from("bigger")),
            None,
            None,
        );
        let UpdateOutcome::Updated {
            previous, current, ..
        } = outcome
        else {
            panic!("expected update");
        };
        assert_eq!(previous, record);
        assert_eq!(current.plan_id, PlanId::from("bigger"));
        assert_eq!(current.parameters, record.parameters);
        assert_eq!(store.get(&record.id).unwrap(), current);
    }

    #[test]
    fn test_update_missing_or_wrong_service() {
        let store = InstanceStore::new();
        let record = test_instance("i-1", json!({}));

        assert_eq!(
            store.update(&record.id, &record.service_id, None, None, None),
            UpdateOutcome::InstanceMissing
        );

        store.insert(record.clone()).unwrap();
        assert_eq!(
            store.update(&record.id, &ServiceId::from("other"), None, None, None),
            UpdateOutcome::ServiceMismatch
        );
    }

    #[test]
    fn test_bind_requires_instance() {
        let store = InstanceStore::new();
        let outcome = store.bind(
            &InstanceId::from("nope"),
            &BindingId::from("b-1"),
            Parameters::new(),
            None,
        );
        assert_eq!(outcome, BindOutcome::InstanceMissing);
    }

    #[test]
    fn test_bind_uses_instance_parameters_as_credentials() {
        let store = InstanceStore::new();
        let record = test_instance("i-1", json!({"color": "Grey"}));
        store.insert(record.clone()).unwrap();

        let BindOutcome::Created { binding, .. } =
            store.bind(&record.id, &BindingId::from("b-1"), Parameters::new(), None)
        else {
            panic!("expected new binding");
        };
        assert_eq!(binding.credentials, params(json!({"color": "Grey"})));
    }

    #[test]
    fn test_rebind_equivalent_or_conflicting() {
        let store = InstanceStore::new();
        let record = test_instance("i-1", json!({}));
        store.insert(record.clone()).unwrap();
        let binding_id = BindingId::from("b-1");

        store.bind(&record.id, &binding_id, params(json!({"app": "a"})), None);
        assert!(matches!(
            store.bind(&record.id, &binding_id, params(json!({"app": "a"})), None),
            BindOutcome::Equivalent(_)
        ));
        assert_eq!(
            store.bind(&record.id, &binding_id, params(json!({"app": "b"})), None),
            BindOutcome::Conflicting
        );
    }

    #[test]
    fn test_remove_drops_bindings() {
        let store = InstanceStore::new();
        let record = test_instance("i-1", json!({}));
        store.insert(record.clone()).unwrap();
        store.bind(&record.id, &BindingId::from("b-1"), Parameters::new(), None);
        store.bind(&record.id, &BindingId::from("b-2"), Parameters::new(), None);
        assert_eq!(store.binding_count(&record.id), 2);

        store.remove(&record.id);
        assert_eq!(store.binding_count(&record.id), 0);
        assert!(store.get_binding(&record.id, &BindingId::from("b-1")).is_none());
    }

    #[test]
    fn test_bind_racing_remove_leaves_no_orphans() {
        let store = Arc::new(InstanceStore::new());

        for round in 0..50 {
            let id = InstanceId::new(format!("i-{round}"));
            store
                .insert(test_instance(id.as_str(), json!({})))
                .unwrap();

            rayon::join(
                || {
                    store.bind(&id, &BindingId::from("b"), Parameters::new(), None);
                },
                || {
                    store.remove(&id);
                },
            );

            // Either the remove ran last (no instance, no binding) or the
            // bind found no instance. An orphaned binding is never possible.
            assert!(!store.contains(&id));
            assert_eq!(store.binding_count(&id), 0);
        }
    }

    #[test]
    fn test_unbind_absent_is_none() {
        let store = InstanceStore::new();
        assert!(store
            .unbind(&InstanceId::from("i"), &BindingId::from("b"))
            .is_none());
    }

    #[test]
    fn test_last_operation_missing_instance() {
        let store = InstanceStore::new();
        assert!(store.last_operation(&InstanceId::from("i")).is_err());

        store.insert(test_instance("i", json!({}))).unwrap();
        assert_eq!(store.last_operation(&InstanceId::from("i")).unwrap(), None);
    }

    #[test]
    #[traced_test]
    fn test_complete_operation_transitions_once() {
        let store = InstanceStore::new();
        let record = test_instance("i-1", json!({}));
        let (_, key) = store.compare_and_insert(record.clone(), in_progress(OperationKind::Provision));
        let key = key.unwrap();
        assert_eq!(store.pending_operations(), vec![key]);

        assert!(store.complete_operation(key, OperationState::Failed, Some("boom".into())));
        assert!(!store.complete_operation(key, OperationState::Succeeded, None));
        assert!(store.pending_operations().is_empty());

        let op = store.last_operation(&record.id).unwrap().unwrap();
        assert_eq!(op.state, OperationState::Failed);
        assert_eq!(op.description.as_deref(), Some("boom"));
        assert!(logs_contain("Operation completed"));
    }

    #[test]
    fn test_complete_unknown_operation() {
        let store = InstanceStore::new();
        assert!(!store.complete_operation(OperationKey(99), OperationState::Succeeded, None));
    }

    #[test]
    fn test_complete_expired_covers_bindings() {
        let store = InstanceStore::new();
        let record = test_instance("i-1", json!({}));
        let (_, provision_key) =
            store.compare_and_insert(record.clone(), in_progress(OperationKind::Provision));
        let BindOutcome::Created {
            operation: bind_key,
            ..
        } = store.bind(
            &record.id,
            &BindingId::from("b-1"),
            Parameters::new(),
            in_progress(OperationKind::Bind),
        )
        else {
            panic!("expected new binding");
        };

        let completed = store.complete_expired(Duration::ZERO);
        assert_eq!(completed, vec![provision_key.unwrap(), bind_key.unwrap()]);

        let op = store
            .binding_last_operation(&record.id, &BindingId::from("b-1"))
            .unwrap();
        assert_eq!(op.state, OperationState::Succeeded);
    }

    #[test]
    fn test_complete_expired_respects_age() {
        let store = InstanceStore::new();
        store.compare_and_insert(
            test_instance("i-1", json!({})),
            in_progress(OperationKind::Provision),
        );
        assert!(store.complete_expired(Duration::from_secs(3600)).is_empty());
        assert_eq!(store.pending_operations().len(), 1);
    }

    #[test]
    fn test_equivalent_retry_after_completion_has_no_operation() {
        let store = InstanceStore::new();
        let record = test_instance("i-1", json!({}));
        let (_, key) =
            store.compare_and_insert(record.clone(), in_progress(OperationKind::Provision));
        assert!(store.complete_operation(key.unwrap(), OperationState::Succeeded, None));

        let (matched, again) = store.compare_and_insert(record, None);
        assert_eq!(matched, Match::Equivalent);
        assert!(again.is_none());
    }

    #[test]
    fn test_pending_operation_not_replaced() {
        let store = InstanceStore::new();
        let record = test_instance("i-1", json!({}));
        let (_, provision) =
            store.compare_and_insert(record.clone(), in_progress(OperationKind::Provision));
        let provision = provision.unwrap();

        let update = OperationStart::new(OperationKind::Update, OperationState::InProgress);
        assert_eq!(store.record_operation(&record.id, update), Some(provision));

        let op = store.last_operation(&record.id).unwrap().unwrap();
        assert_eq!(op.kind, OperationKind::Provision);
        assert!(store.complete_operation(provision, OperationState::Succeeded, None));

        // Once terminal, the next operation gets a fresh key
        let next = store.record_operation(&record.id, update).unwrap();
        assert_ne!(next, provision);
    }

    #[test]
    fn test_operation_keys_are_unique() {
        let store = InstanceStore::new();
        store.insert(test_instance("i-1", json!({}))).unwrap();
        let start = OperationStart::new(OperationKind::Update, OperationState::Succeeded);
        let a = store.record_operation(&InstanceId::from("i-1"), start).unwrap();
        let b = store.record_operation(&InstanceId::from("i-1"), start).unwrap();
        assert_ne!(a, b);
        assert!(store
            .record_operation(&InstanceId::from("missing"), start)
            .is_none());
    }
}
