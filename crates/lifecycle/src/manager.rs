//! The lifecycle manager.

use crate::{example_credentials, AsyncPolicy, CompletionMode, LifecycleConfig, UpdateMode};
use osb_core::{
    BindRequest, BindResponse, BindingLastOperationRequest, BrokerError, DeprovisionRequest,
    DeprovisionResponse, GetBindingRequest, GetBindingResponse, LastOperationRequest,
    LastOperationResponse, ProvisionRequest, ProvisionResponse, ServiceBroker, UnbindRequest,
    UnbindResponse, UpdateInstanceRequest, UpdateInstanceResponse,
};
use osb_store::{BindOutcome, InstanceStore, Match, OperationStart, UpdateOutcome};
use osb_types::{
    Catalog, InstanceRecord, OperationKey, OperationKind, OperationRecord, OperationState,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Answers lifecycle requests against an owned [`InstanceStore`].
///
/// Share it between request handlers as `Arc<LifecycleManager>`. Independent
/// managers never share state, so tests create one per case.
#[derive(Debug)]
pub struct LifecycleManager {
    /// Owned instance/binding/operation state.
    store: InstanceStore,

    /// Async reporting policy, fixed at construction.
    policy: AsyncPolicy,

    /// Manager configuration.
    config: LifecycleConfig,

    /// Catalog served by `catalog()`.
    catalog: Catalog,
}

impl LifecycleManager {
    /// Create a manager serving the example catalog.
    pub fn new(config: LifecycleConfig) -> Self {
        Self::with_catalog(config, Catalog::example())
    }

    /// Create a manager serving the given catalog.
    pub fn with_catalog(config: LifecycleConfig, catalog: Catalog) -> Self {
        Self {
            store: InstanceStore::new(),
            policy: AsyncPolicy::new(config.async_enabled),
            config,
            catalog,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &InstanceStore {
        &self.store
    }

    /// The async reporting policy.
    pub fn policy(&self) -> AsyncPolicy {
        self.policy
    }

    /// The manager configuration.
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Insert pre-existing instances.
    ///
    /// Records equivalent to what is already stored are skipped. A record
    /// conflicting with a stored one fails with `Conflict`; records before
    /// it stay inserted. Returns the number of records inserted.
    pub fn seed(
        &self,
        records: impl IntoIterator<Item = InstanceRecord>,
    ) -> Result<usize, BrokerError> {
        let mut inserted = 0;
        for record in records {
            if record.id.is_empty() {
                return Err(BrokerError::InvalidRequest(
                    "seed instance id must not be empty".to_string(),
                ));
            }
            let id = record.id.clone();
            match self.store.compare_and_insert(record, None).0 {
                Match::Absent => inserted += 1,
                Match::Equivalent => {}
                Match::Conflicting => return Err(BrokerError::instance_conflict(&id)),
            }
        }
        info!(inserted, "Seeded instances");
        Ok(inserted)
    }

    /// Move an in-progress operation to a terminal state.
    pub fn complete_operation(
        &self,
        key: OperationKey,
        state: OperationState,
        description: Option<String>,
    ) -> bool {
        self.store.complete_operation(key, state, description)
    }

    /// Complete every in-progress operation started at least `min_age` ago.
    pub fn complete_expired(&self, min_age: Duration) -> Vec<OperationKey> {
        self.store.complete_expired(min_age)
    }

    /// Operation record to open for an asynchronously reported operation.
    fn operation_start(&self, kind: OperationKind) -> OperationStart {
        let state = match self.config.completion_mode {
            CompletionMode::Immediate => OperationState::Succeeded,
            CompletionMode::Deferred => OperationState::InProgress,
        };
        OperationStart::new(kind, state)
    }

    fn report(record: Option<OperationRecord>) -> LastOperationResponse {
        match record {
            Some(op) => LastOperationResponse {
                state: op.state,
                description: op.description,
            },
            None => LastOperationResponse::succeeded(),
        }
    }
}

impl ServiceBroker for LifecycleManager {
    fn catalog(&self) -> &Catalog {
        debug!(services = self.catalog.services.len(), "Serving catalog");
        &self.catalog
    }

    fn provision(&self, request: ProvisionRequest) -> Result<ProvisionResponse, BrokerError> {
        if request.instance_id.is_empty() {
            return Err(BrokerError::InvalidRequest(
                "instance_id must not be empty".to_string(),
            ));
        }

        let is_async = self.policy.resolve(request.accepts_incomplete);
        let candidate = InstanceRecord::new(
            request.instance_id,
            request.service_id,
            request.plan_id,
            request.parameters,
        );
        let instance_id = candidate.id.clone();
        let operation = is_async.then(|| self.operation_start(OperationKind::Provision));

        match self.store.compare_and_insert(candidate, operation) {
            (Match::Equivalent, pending) => {
                // A retry of a provision still in progress keeps polling it.
                let operation = pending.filter(|_| is_async);
                debug!(
                    instance_id = %instance_id,
                    pending = operation.is_some(),
                    "Provision retried with identical request"
                );
                Ok(ProvisionResponse {
                    already_exists: true,
                    is_async: operation.is_some(),
                    operation,
                })
            }
            (Match::Conflicting, _) => {
                warn!(instance_id = %instance_id, "Instance id in use with different attributes");
                Err(BrokerError::instance_conflict(&instance_id))
            }
            (Match::Absent, operation) => {
                info!(instance_id = %instance_id, is_async, "Provisioned instance");
                Ok(ProvisionResponse {
                    already_exists: false,
                    is_async,
                    operation,
                })
            }
        }
    }

    fn deprovision(
        &self,
        request: DeprovisionRequest,
    ) -> Result<DeprovisionResponse, BrokerError> {
        let removed = self.store.remove(&request.instance_id);
        if removed.is_some() {
            info!(instance_id = %request.instance_id, "Deprovisioned instance");
        } else {
            debug!(instance_id = %request.instance_id, "Deprovision of unknown instance");
        }

        Ok(DeprovisionResponse {
            is_async: self.policy.resolve(request.accepts_incomplete),
            operation: None,
        })
    }

    fn bind(&self, request: BindRequest) -> Result<BindResponse, BrokerError> {
        let is_async = self.policy.resolve(request.accepts_incomplete);
        let operation = is_async.then(|| self.operation_start(OperationKind::Bind));

        match self.store.bind(
            &request.instance_id,
            &request.binding_id,
            request.parameters,
            operation,
        ) {
            BindOutcome::Created { binding, operation } => {
                info!(
                    instance_id = %request.instance_id,
                    binding_id = %request.binding_id,
                    is_async,
                    "Created binding"
                );
                Ok(BindResponse {
                    credentials: binding.credentials,
                    already_exists: false,
                    is_async,
                    operation,
                })
            }
            BindOutcome::Equivalent(binding) => Ok(BindResponse {
                credentials: binding.credentials,
                already_exists: true,
                ..Default::default()
            }),
            BindOutcome::Conflicting => {
                warn!(
                    instance_id = %request.instance_id,
                    binding_id = %request.binding_id,
                    "Binding id in use with different parameters"
                );
                Err(BrokerError::binding_conflict(
                    &request.instance_id,
                    &request.binding_id,
                ))
            }
            BindOutcome::InstanceMissing => {
                warn!(instance_id = %request.instance_id, "Bind to unknown instance");
                Err(BrokerError::instance_not_found(&request.instance_id))
            }
        }
    }

    fn unbind(&self, request: UnbindRequest) -> Result<UnbindResponse, BrokerError> {
        if self
            .store
            .unbind(&request.instance_id, &request.binding_id)
            .is_none()
        {
            debug!(
                instance_id = %request.instance_id,
                binding_id = %request.binding_id,
                "Unbind of untracked binding"
            );
        }
        Ok(UnbindResponse {})
    }

    fn update(
        &self,
        request: UpdateInstanceRequest,
    ) -> Result<UpdateInstanceResponse, BrokerError> {
        let is_async = self.policy.resolve(request.accepts_incomplete);
        let start = self.operation_start(OperationKind::Update);

        match self.config.update_mode {
            UpdateMode::Echo => {
                let operation = if is_async {
                    self.store.record_operation(&request.instance_id, start)
                } else {
                    None
                };
                Ok(UpdateInstanceResponse {
                    is_async,
                    operation,
                })
            }
            UpdateMode::Apply => match self.store.update(
                &request.instance_id,
                &request.service_id,
                request.plan_id,
                request.parameters,
                is_async.then_some(start),
            ) {
                UpdateOutcome::Updated {
                    previous,
                    current,
                    operation,
                } => {
                    info!(
                        instance_id = %request.instance_id,
                        old_plan = %previous.plan_id,
                        new_plan = %current.plan_id,
                        is_async,
                        "Updated instance"
                    );
                    Ok(UpdateInstanceResponse {
                        is_async,
                        operation,
                    })
                }
                UpdateOutcome::InstanceMissing => {
                    warn!(instance_id = %request.instance_id, "Update of unknown instance");
                    Err(BrokerError::instance_not_found(&request.instance_id))
                }
                UpdateOutcome::ServiceMismatch => {
                    warn!(
                        instance_id = %request.instance_id,
                        service_id = %request.service_id,
                        "Update names a different service"
                    );
                    Err(BrokerError::instance_conflict(&request.instance_id))
                }
            },
        }
    }

    fn last_operation(
        &self,
        request: LastOperationRequest,
    ) -> Result<LastOperationResponse, BrokerError> {
        let record = self
            .store
            .last_operation(&request.instance_id)
            .inspect_err(|_| {
                warn!(instance_id = %request.instance_id, "Last operation of unknown instance");
            })?;

        if let (Some(asked), Some(op)) = (request.operation, record.as_ref()) {
            if asked != op.key {
                debug!(
                    instance_id = %request.instance_id,
                    asked = %asked,
                    latest = %op.key,
                    "Polled operation is not the latest"
                );
            }
        }
        Ok(Self::report(record))
    }

    fn binding_last_operation(
        &self,
        request: BindingLastOperationRequest,
    ) -> Result<LastOperationResponse, BrokerError> {
        Ok(Self::report(self.store.binding_last_operation(
            &request.instance_id,
            &request.binding_id,
        )))
    }

    fn get_binding(&self, request: GetBindingRequest) -> Result<GetBindingResponse, BrokerError> {
        let credentials = match self
            .store
            .get_binding(&request.instance_id, &request.binding_id)
        {
            Some(binding) => binding.credentials,
            None => example_credentials(),
        };
        Ok(GetBindingResponse { credentials })
    }
}
