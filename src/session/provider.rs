//! Keeper Mobile signer provider
//!
//! Holds at most one WalletConnect session with Keeper Mobile, mediates
//! login and logout, and forwards signing requests over that session.

use crate::audit::AuditLog;
use crate::chain::fee::{self, FeeCalculator, NodeFeeCalculator};
use crate::chain::{chain_id, SignedTx, SignerTx, WAVES_NAMESPACE};
use crate::config::Config;
use crate::error::{KeeperError, KeeperResult};
use crate::pairing::{HeadlessPrompt, PairingPrompt, TerminalPrompt};
use crate::session::events::{AuthEvent, AuthEventKind, EventEmitter, HandlerId};
use crate::session::state::{ConnectOptions, ProviderState, SessionStatus, UserData};
use crate::storage::{FileStore, KeyValueStore, MemoryStore, LAST_TOPIC_KEY};
use crate::transport::{
    ClientEvent, ClientFactory, ClientOptions, ConnectParams, DisconnectReason, NamespaceRequest,
    PendingSession, RpcMethod, Session, SessionRequest, SignClient,
};
use crate::ui::UiContext;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Message accepted by `sign_message`
#[derive(Debug, Clone, PartialEq)]
pub enum SignableMessage {
    Text(String),
    Number(i64),
}

impl SignableMessage {
    fn encode(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for SignableMessage {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for SignableMessage {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for SignableMessage {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// One entry of typed data, as in a data transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedData {
    #[serde(rename = "type")]
    pub data_type: String,
    pub key: String,
    pub value: Value,
}

struct Inner {
    factory: Arc<dyn ClientFactory>,
    client_options: ClientOptions,
    client: OnceCell<KeeperResult<Arc<dyn SignClient>>>,
    store: Arc<dyn KeyValueStore>,
    prompt: Arc<dyn PairingPrompt>,
    fees: Option<Arc<dyn FeeCalculator>>,
    verify_signatures: bool,
    audit: AuditLog,
    emitter: EventEmitter,
    state: Mutex<ProviderState>,
}

/// Signer provider backed by Keeper Mobile
///
/// Cloning is cheap; clones share the same session.
#[derive(Clone)]
pub struct ProviderKeeperMobile {
    inner: Arc<Inner>,
}

/// Builder for [`ProviderKeeperMobile`]
pub struct ProviderBuilder {
    factory: Arc<dyn ClientFactory>,
    client_options: ClientOptions,
    store: Arc<dyn KeyValueStore>,
    prompt: Arc<dyn PairingPrompt>,
    fees: Option<Arc<dyn FeeCalculator>>,
    verify_signatures: bool,
    audit: AuditLog,
}

impl ProviderBuilder {
    pub fn client_options(mut self, options: ClientOptions) -> Self {
        self.client_options = options;
        self
    }

    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = store;
        self
    }

    pub fn prompt(mut self, prompt: Arc<dyn PairingPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn fee_calculator(mut self, fees: Arc<dyn FeeCalculator>) -> Self {
        self.fees = Some(fees);
        self
    }

    pub fn verify_signatures(mut self, verify: bool) -> Self {
        self.verify_signatures = verify;
        self
    }

    pub fn audit(mut self, audit: AuditLog) -> Self {
        self.audit = audit;
        self
    }

    pub fn build(self) -> ProviderKeeperMobile {
        ProviderKeeperMobile {
            inner: Arc::new(Inner {
                factory: self.factory,
                client_options: self.client_options,
                client: OnceCell::new(),
                store: self.store,
                prompt: self.prompt,
                fees: self.fees,
                verify_signatures: self.verify_signatures,
                audit: self.audit,
                emitter: EventEmitter::new(),
                state: Mutex::new(ProviderState::default()),
            }),
        }
    }
}

impl ProviderKeeperMobile {
    /// Start building a provider around a sign client factory
    ///
    /// Defaults: in-memory storage, headless pairing prompt, no fee
    /// calculation, no signature checks, no audit log.
    pub fn builder(factory: Arc<dyn ClientFactory>) -> ProviderBuilder {
        ProviderBuilder {
            factory,
            client_options: Config::default().client_options(),
            store: Arc::new(MemoryStore::new()),
            prompt: Arc::new(HeadlessPrompt),
            fees: None,
            verify_signatures: false,
            audit: AuditLog::disabled(),
        }
    }

    /// Builder carrying the settings taken from configuration: client
    /// options, signature checks, the audit log, and node fee calculation
    /// when enabled
    pub fn configured(config: &Config, factory: Arc<dyn ClientFactory>) -> ProviderBuilder {
        let builder = Self::builder(factory)
            .client_options(config.client_options())
            .verify_signatures(config.signing.verify_signatures)
            .audit(AuditLog::new(config));

        if config.signing.calculate_fees {
            builder.fee_calculator(Arc::new(NodeFeeCalculator::new()))
        } else {
            builder
        }
    }

    /// Provider wired from configuration, with file storage and the
    /// terminal pairing prompt
    pub fn from_config(config: &Config, factory: Arc<dyn ClientFactory>) -> Self {
        Self::configured(config, factory)
            .store(Arc::new(FileStore::new()))
            .prompt(Arc::new(TerminalPrompt::new(UiContext::detect())))
            .build()
    }

    /// Wait for the sign client to be initialized
    pub async fn ready(&self) -> KeeperResult<()> {
        self.client().await.map(|_| ())
    }

    /// The logged-in user, if any
    pub fn user(&self) -> Option<UserData> {
        self.inner.lock_state().user.clone()
    }

    /// Current lifecycle state
    pub fn status(&self) -> SessionStatus {
        let initialized = self.inner.client.initialized();
        self.inner.lock_state().status(initialized)
    }

    /// Options passed to the last `connect` call
    pub fn options(&self) -> Option<ConnectOptions> {
        self.inner.lock_state().options.clone()
    }

    /// Subscribe to an auth event
    pub fn on<F>(&self, kind: AuthEventKind, handler: F) -> HandlerId
    where
        F: Fn(&AuthEvent) + Send + Sync + 'static,
    {
        self.inner.emitter.on(kind, handler)
    }

    /// Subscribe to the next occurrence of an auth event
    pub fn once<F>(&self, kind: AuthEventKind, handler: F) -> HandlerId
    where
        F: Fn(&AuthEvent) + Send + Sync + 'static,
    {
        self.inner.emitter.once(kind, handler)
    }

    /// Remove a subscription
    pub fn off(&self, id: HandlerId) -> bool {
        self.inner.emitter.off(id)
    }

    async fn client(&self) -> KeeperResult<Arc<dyn SignClient>> {
        let inner = self.inner.clone();
        self.inner
            .client
            .get_or_init(|| Inner::init_client(inner))
            .await
            .clone()
    }

    /// Configure the network and resume a persisted session if it matches
    ///
    /// Options are recorded before the client is created, so a first
    /// `connect` resumes the persisted session during initialization.
    pub async fn connect(&self, options: ConnectOptions) -> KeeperResult<()> {
        debug!(
            "Connecting to network '{}' ({})",
            char::from(options.network_byte),
            options.node_url
        );
        self.inner.lock_state().options = Some(options);

        let client = self.client().await?;
        self.inner.check_persisted_state(client.as_ref()).await;
        Ok(())
    }

    /// Log in, pairing with Keeper Mobile if there is no session yet
    ///
    /// Concurrent calls share a single handshake.
    pub async fn login(&self) -> KeeperResult<UserData> {
        let client = self.client().await?;

        let pending = {
            let mut state = self.inner.lock_state();
            if let Some(user) = &state.user {
                return Ok(user.clone());
            }
            let options = state.options.clone().ok_or(KeeperError::NotConnected)?;

            match &state.pending_login {
                Some(pending) => {
                    debug!("Joining login already in progress");
                    pending.clone()
                }
                None => {
                    let pending = Inner::handshake(self.inner.clone(), client, options)
                        .boxed()
                        .shared();
                    state.pending_login = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// Disconnect the session, if any
    pub async fn logout(&self) -> KeeperResult<()> {
        let topic = match &self.inner.lock_state().session {
            Some(session) => session.topic.clone(),
            None => return Ok(()),
        };

        let client = self.client().await?;
        client
            .disconnect(&topic, DisconnectReason::user_disconnected())
            .await?;

        if self.inner.take_session(&topic) {
            self.inner.store_topic(None).await;
            self.inner.emitter.trigger(&AuthEvent::Logout);
            info!("Logged out of session {}", topic);
            self.inner
                .audit
                .log("session.logout", &json!({ "topic": topic }))
                .await;
        }
        Ok(())
    }

    /// Sign one transaction, or several as one package
    pub async fn sign(&self, transactions: Vec<SignerTx>) -> KeeperResult<Vec<SignedTx>> {
        if transactions.is_empty() {
            return Err(KeeperError::EmptyTransactionList);
        }
        for tx in &transactions {
            tx.ensure_supported()?;
        }

        let user = self.login().await?;
        let options = self
            .options()
            .ok_or(KeeperError::NotConnected)?;

        let mut prepared = Vec::with_capacity(transactions.len());
        for tx in transactions {
            let tx = tx.normalized(options.network_byte, &user.public_key);
            let tx = match &self.inner.fees {
                Some(fees) => fee::with_fee(fees.as_ref(), &options.node_url, tx).await?,
                None => tx,
            };
            prepared.push(tx);
        }

        let signed = if let [tx] = prepared.as_slice() {
            let method = RpcMethod::SignTransaction;
            let payload = serde_json::to_string(tx)?;
            let reply = self.request(method, &payload).await?;
            vec![SignedTx(parse_reply(method, &reply)?)]
        } else {
            let method = RpcMethod::SignTransactionPackage;
            let payload = serde_json::to_string(&prepared)?;
            let reply = self.request(method, &payload).await?;
            let signed: Vec<Value> = parse_reply(method, &reply)?;
            if signed.len() != prepared.len() {
                return Err(KeeperError::invalid_response(
                    method.as_str(),
                    format!("sent {} transactions, got {}", prepared.len(), signed.len()),
                ));
            }
            signed.into_iter().map(SignedTx).collect()
        };

        if self.inner.verify_signatures {
            for (signed, sent) in signed.iter().zip(&prepared) {
                signed.verify_against(sent)?;
            }
            debug!("Verified {} signed transaction(s)", signed.len());
        }

        Ok(signed)
    }

    /// Sign an arbitrary message
    pub async fn sign_message(&self, data: impl Into<SignableMessage>) -> KeeperResult<String> {
        let message = data.into().encode();
        self.login().await?;
        self.request(RpcMethod::SignMessage, &message).await
    }

    /// Sign a list of typed data entries
    pub async fn sign_typed_data(&self, data: &[TypedData]) -> KeeperResult<String> {
        let payload = serde_json::to_string(data)?;
        self.login().await?;
        self.request(RpcMethod::SignTypedData, &payload).await
    }

    /// Sign an exchange order
    pub async fn sign_order(&self, order: &Value) -> KeeperResult<String> {
        let payload = serde_json::to_string(order)?;
        self.login().await?;
        self.request(RpcMethod::SignOrder, &payload).await
    }

    /// Dispatch an RPC method with a single string parameter over the session
    async fn request(&self, method: RpcMethod, payload: &str) -> KeeperResult<String> {
        let client = self.client().await?;
        let (topic, network_byte) = {
            let state = self.inner.lock_state();
            match (&state.session, &state.options) {
                (Some(session), Some(options)) => (session.topic.clone(), options.network_byte),
                _ => return Err(KeeperError::NotLoggedIn),
            }
        };

        debug!("Dispatching {} over session {}", method, topic);
        self.inner
            .audit
            .log(
                "sign.request",
                &json!({
                    "method": method.as_str(),
                    "topic": topic,
                    "payload_sha256": AuditLog::digest(payload),
                }),
            )
            .await;

        let result = client
            .request(SessionRequest {
                topic,
                chain_id: chain_id(network_byte),
                method: method.as_str().to_string(),
                params: json!([payload]),
            })
            .await?;

        match result {
            Value::String(reply) => Ok(reply),
            other => Err(KeeperError::invalid_response(
                method.as_str(),
                format!("expected a string result, got {}", other),
            )),
        }
    }
}

fn parse_reply<T: serde::de::DeserializeOwned>(method: RpcMethod, reply: &str) -> KeeperResult<T> {
    serde_json::from_str(reply)
        .map_err(|e| KeeperError::invalid_response(method.as_str(), e.to_string()))
}

/// Namespaces requested for a network
fn required_namespaces(network_byte: u8) -> BTreeMap<String, NamespaceRequest> {
    let mut namespaces = BTreeMap::new();
    namespaces.insert(
        WAVES_NAMESPACE.to_string(),
        NamespaceRequest {
            methods: RpcMethod::all_names(),
            chains: vec![chain_id(network_byte)],
            events: vec![],
        },
    );
    namespaces
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn init_client(inner: Arc<Inner>) -> KeeperResult<Arc<dyn SignClient>> {
        let client = inner
            .factory
            .init(inner.client_options.clone())
            .await
            .map_err(|e| match e {
                KeeperError::ClientInit(_) => e,
                other => KeeperError::ClientInit(other.to_string()),
            })?;
        debug!("Sign client initialized ({})", inner.client_options.relay_url);

        let weak = Arc::downgrade(&inner);
        client.on(Box::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_event(event);
            }
        }));

        inner.check_persisted_state(client.as_ref()).await;
        Ok(client)
    }

    /// Write (`Some`) or remove (`None`) the persisted topic on the
    /// blocking pool
    async fn store_topic(&self, topic: Option<String>) {
        let store = self.store.clone();
        let outcome = tokio::task::spawn_blocking(move || match topic {
            Some(topic) => store.set_item(LAST_TOPIC_KEY, &topic),
            None => store.remove_item(LAST_TOPIC_KEY),
        })
        .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to update persisted session topic: {}", e),
            Err(e) => warn!("Storage task failed: {}", e),
        }
    }

    async fn stored_topic(&self) -> Option<String> {
        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || store.get_item(LAST_TOPIC_KEY)).await {
            Ok(Ok(topic)) => topic,
            Ok(Err(e)) => {
                warn!("Failed to read persisted session topic: {}", e);
                None
            }
            Err(e) => {
                warn!("Storage task failed: {}", e);
                None
            }
        }
    }

    /// Event handlers run synchronously, so they remove the topic in place
    fn forget_topic(&self) {
        if let Err(e) = self.store.remove_item(LAST_TOPIC_KEY) {
            warn!("Failed to remove persisted session topic: {}", e);
        }
    }

    /// The persisted session if the client still knows it, else its most
    /// recent one
    async fn persisted_session(&self, client: &dyn SignClient) -> Option<Session> {
        let topic = self.stored_topic().await;
        let sessions = client.sessions();
        topic
            .and_then(|topic| sessions.iter().find(|s| s.topic == topic).cloned())
            .or_else(|| sessions.last().cloned())
    }

    /// Adopt the current or persisted session when it matches the network,
    /// discard it otherwise
    ///
    /// Without connect options there is nothing to validate against, so
    /// resuming waits for `connect`.
    async fn check_persisted_state(&self, client: &dyn SignClient) {
        let (network_byte, current) = {
            let state = self.lock_state();
            match &state.options {
                Some(options) => (options.network_byte, state.session.clone()),
                None => return,
            }
        };

        let session = match current {
            Some(session) => session,
            None => match self.persisted_session(client).await {
                Some(session) => session,
                None => return,
            },
        };

        match UserData::from_session(&session, network_byte) {
            Ok(Some(user)) => {
                let topic = session.topic.clone();
                let changed = self.lock_state().adopt(session, user.clone());
                self.store_topic(Some(topic.clone())).await;
                if changed {
                    info!("Resumed session {} as {}", topic, user.address);
                    self.emitter.trigger(&AuthEvent::Login(user));
                }
            }
            Ok(None) => {
                warn!(
                    "Discarding session {}: no account for network '{}'",
                    session.topic,
                    char::from(network_byte)
                );
                self.discard(&session.topic).await;
            }
            Err(e) => {
                warn!("Discarding session {}: {}", session.topic, e);
                self.discard(&session.topic).await;
            }
        }
    }

    /// Drop a session that could not be adopted
    async fn discard(&self, topic: &str) {
        let was_active = self.take_session(topic);
        self.store_topic(None).await;
        if was_active {
            self.emitter.trigger(&AuthEvent::Logout);
        }
    }

    /// Clear `topic` from state if it is the active session
    fn take_session(&self, topic: &str) -> bool {
        let mut state = self.lock_state();
        if state.session.as_ref().map(|s| s.topic.as_str()) == Some(topic) {
            state.clear().is_some()
        } else {
            false
        }
    }

    /// Synchronous [`Inner::take_session`] for event handlers; forgets the
    /// topic and emits `logout` when it was active
    fn end_session(&self, topic: &str) -> bool {
        if !self.take_session(topic) {
            return false;
        }
        self.forget_topic();
        self.emitter.trigger(&AuthEvent::Logout);
        true
    }

    fn handle_event(&self, event: ClientEvent) {
        match event {
            ClientEvent::SessionUpdated(session) => self.on_session_updated(session),
            ClientEvent::SessionDeleted { topic } => {
                debug!("Event: session_deleted {}", topic);
                if self.end_session(&topic) {
                    info!("Session {} deleted", topic);
                }
            }
        }
    }

    fn on_session_updated(&self, session: Session) {
        debug!("Event: session_updated {}", session.topic);

        let network_byte = {
            let state = self.lock_state();
            let active = state.session.as_ref().map(|s| s.topic.as_str());
            match (&state.options, active) {
                (Some(options), Some(topic)) if topic == session.topic => options.network_byte,
                _ => return,
            }
        };

        match UserData::from_session(&session, network_byte) {
            Ok(Some(user)) => {
                if self.lock_state().adopt(session, user.clone()) {
                    info!("Session account changed to {}", user.address);
                    self.emitter.trigger(&AuthEvent::Login(user));
                }
            }
            _ => {
                warn!(
                    "Session {} no longer has an account for network '{}'",
                    session.topic,
                    char::from(network_byte)
                );
                self.end_session(&session.topic);
            }
        }
    }

    async fn handshake(
        self: Arc<Self>,
        client: Arc<dyn SignClient>,
        options: ConnectOptions,
    ) -> KeeperResult<UserData> {
        let session = match self.pair(client.as_ref(), &options).await {
            Ok(session) => session,
            Err(e) => {
                self.lock_state().pending_login = None;
                warn!("Login failed: {}", e);
                return Err(e);
            }
        };

        // `connect` may have switched networks while the wallet was pairing
        let outcome = {
            let mut state = self.lock_state();
            state.pending_login = None;
            let network_byte = state
                .options
                .as_ref()
                .map_or(options.network_byte, |current| current.network_byte);
            let outcome = UserData::require_from_session(&session, network_byte);
            if let Ok(user) = &outcome {
                state.adopt(session.clone(), user.clone());
            }
            outcome
        };

        let user = match outcome {
            Ok(user) => user,
            Err(e) => {
                warn!("Login failed: {}", e);
                if let Err(disconnect_err) = client
                    .disconnect(&session.topic, DisconnectReason::user_disconnected())
                    .await
                {
                    warn!(
                        "Failed to disconnect rejected session {}: {}",
                        session.topic, disconnect_err
                    );
                }
                return Err(e);
            }
        };

        self.store_topic(Some(session.topic.clone())).await;
        info!("Logged in as {}", user.address);
        self.audit
            .log(
                "session.login",
                &json!({ "topic": session.topic, "address": user.address }),
            )
            .await;
        self.emitter.trigger(&AuthEvent::Login(user.clone()));
        Ok(user)
    }

    async fn pair(&self, client: &dyn SignClient, options: &ConnectOptions) -> KeeperResult<Session> {
        let params = ConnectParams {
            pairing_topic: None,
            required_namespaces: required_namespaces(options.network_byte),
            metadata: self.client_options.metadata.clone(),
        };

        let PendingSession { uri, approval } = client.connect(params).await?;
        let Some(uri) = uri else {
            return approval.await;
        };

        debug!("Waiting for wallet to pair");
        let session = tokio::select! {
            session = approval => session,
            () = self.prompt.open(&uri) => Err(KeeperError::LoginCancelled),
        };
        self.prompt.close();
        session
    }
}
