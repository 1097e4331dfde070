//! In-process sign client double

use async_trait::async_trait;
use futures_util::FutureExt;
use keeper_mobile::error::{KeeperError, KeeperResult};
use keeper_mobile::pairing::PairingPrompt;
use keeper_mobile::transport::{
    ClientEvent, ClientEventHandler, ClientFactory, ClientOptions, ConnectParams,
    DisconnectReason, PendingSession, Session, SessionNamespace, SessionRequest, SignClient,
};
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

pub fn public_key(seed: u8) -> String {
    bs58::encode([seed; 32]).into_string()
}

pub fn proof(seed: u8) -> String {
    bs58::encode([seed; 64]).into_string()
}

pub fn session(topic: &str, accounts: &[String]) -> Session {
    let mut namespaces = BTreeMap::new();
    namespaces.insert(
        "waves".to_string(),
        SessionNamespace {
            accounts: accounts.to_vec(),
            methods: vec!["waves_signTransaction".to_string()],
            events: vec![],
        },
    );
    Session {
        topic: topic.to_string(),
        namespaces,
        peer: None,
        expiry: None,
    }
}

/// Session with a single account on the network
pub fn waves_session(topic: &str, network_code: char, public_key: &str) -> Session {
    session(topic, &[format!("waves:{}:{}", network_code, public_key)])
}

type Approval = oneshot::Sender<KeeperResult<Session>>;

#[derive(Default)]
pub struct MockClient {
    sessions: Arc<Mutex<Vec<Session>>>,
    handlers: Mutex<Vec<ClientEventHandler>>,
    approvals: Mutex<VecDeque<Approval>>,
    auto_approve: Mutex<Option<Session>>,
    pairing_uri: Mutex<Option<String>>,
    reply: Mutex<Option<Value>>,
    connects: AtomicUsize,
    connect_params: Mutex<Vec<ConnectParams>>,
    requests: Mutex<Vec<SessionRequest>>,
    disconnects: Mutex<Vec<(String, DisconnectReason)>>,
    fail_disconnect: AtomicBool,
}

impl MockClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Approve every proposal with `session`
    pub fn auto_approve(&self, session: Session) {
        *self.auto_approve.lock().unwrap() = Some(session);
    }

    pub fn set_pairing_uri(&self, uri: &str) {
        *self.pairing_uri.lock().unwrap() = Some(uri.to_string());
    }

    /// Return `reply` to every request instead of echoing a signature
    pub fn set_reply(&self, reply: Value) {
        *self.reply.lock().unwrap() = Some(reply);
    }

    pub fn fail_disconnect(&self, fail: bool) {
        self.fail_disconnect.store(fail, Ordering::SeqCst);
    }

    pub fn add_session(&self, session: Session) {
        self.sessions.lock().unwrap().push(session);
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn connect_params(&self) -> Vec<ConnectParams> {
        self.connect_params.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<SessionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn disconnects(&self) -> Vec<(String, DisconnectReason)> {
        self.disconnects.lock().unwrap().clone()
    }

    /// Wait until a proposal is waiting for an answer
    pub async fn wait_for_proposal(&self) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.approvals.lock().unwrap().is_empty() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("no session proposal arrived");
    }

    /// Answer the oldest pending proposal
    pub fn answer(&self, outcome: KeeperResult<Session>) {
        let sender = self
            .approvals
            .lock()
            .unwrap()
            .pop_front()
            .expect("no pending proposal");
        let _ = sender.send(outcome);
    }

    /// Push an event to every subscriber, like the relay would
    pub fn emit(&self, event: ClientEvent) {
        for handler in self.handlers.lock().unwrap().iter() {
            handler(event.clone());
        }
    }

    fn sign(tx: &Value) -> Value {
        let mut signed = tx.clone();
        signed["id"] = Value::String(bs58::encode([9u8; 32]).into_string());
        signed["proofs"] = serde_json::json!([proof(1)]);
        signed
    }

    fn respond(request: &SessionRequest) -> Value {
        let payload = request.params[0].as_str().unwrap_or_default();
        match request.method.as_str() {
            "waves_signTransaction" => {
                let tx: Value = serde_json::from_str(payload).unwrap();
                Value::String(Self::sign(&tx).to_string())
            }
            "waves_signTransactionPackage" => {
                let txs: Vec<Value> = serde_json::from_str(payload).unwrap();
                let signed: Vec<Value> = txs.iter().map(Self::sign).collect();
                Value::String(Value::Array(signed).to_string())
            }
            _ => Value::String(proof(2)),
        }
    }
}

#[async_trait]
impl SignClient for MockClient {
    async fn connect(&self, params: ConnectParams) -> KeeperResult<PendingSession> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.connect_params.lock().unwrap().push(params);

        let sessions = self.sessions.clone();
        let uri = self.pairing_uri.lock().unwrap().clone();

        let auto = self.auto_approve.lock().unwrap().clone();

        let approval = match auto {
            Some(session) => async move {
                sessions.lock().unwrap().push(session.clone());
                Ok::<_, KeeperError>(session)
            }
            .boxed(),
            None => {
                let (tx, rx) = oneshot::channel();
                self.approvals.lock().unwrap().push_back(tx);
                async move {
                    let session = rx
                        .await
                        .map_err(|_| KeeperError::transport("proposal expired"))??;
                    sessions.lock().unwrap().push(session.clone());
                    Ok::<_, KeeperError>(session)
                }
                .boxed()
            }
        };

        Ok(PendingSession { uri, approval })
    }

    async fn disconnect(&self, topic: &str, reason: DisconnectReason) -> KeeperResult<()> {
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(KeeperError::transport("relay unreachable"));
        }
        self.disconnects
            .lock()
            .unwrap()
            .push((topic.to_string(), reason));
        self.sessions.lock().unwrap().retain(|s| s.topic != topic);
        Ok(())
    }

    async fn request(&self, request: SessionRequest) -> KeeperResult<Value> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.reply.lock().unwrap().clone();
        if let Some(reply) = reply {
            return Ok(reply);
        }
        Ok(Self::respond(&request))
    }

    fn on(&self, handler: ClientEventHandler) {
        self.handlers.lock().unwrap().push(handler);
    }

    fn sessions(&self) -> Vec<Session> {
        self.sessions.lock().unwrap().clone()
    }
}

pub struct MockFactory {
    client: Arc<MockClient>,
    inits: AtomicUsize,
    fail: bool,
}

impl MockFactory {
    pub fn new(client: Arc<MockClient>) -> Arc<Self> {
        Arc::new(Self {
            client,
            inits: AtomicUsize::new(0),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            client: MockClient::new(),
            inits: AtomicUsize::new(0),
            fail: true,
        })
    }

    pub fn init_count(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientFactory for MockFactory {
    async fn init(&self, _options: ClientOptions) -> KeeperResult<Arc<dyn SignClient>> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(KeeperError::transport("project id rejected"));
        }
        Ok(self.client.clone() as Arc<dyn SignClient>)
    }
}

/// Prompt that records what it was shown; dismisses at once when asked to
#[derive(Default)]
pub struct ScriptedPrompt {
    dismiss: bool,
    shown: Mutex<Vec<String>>,
    closed: AtomicUsize,
}

impl ScriptedPrompt {
    pub fn waiting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn dismissing() -> Arc<Self> {
        Arc::new(Self {
            dismiss: true,
            ..Self::default()
        })
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PairingPrompt for ScriptedPrompt {
    async fn open(&self, uri: &str) {
        self.shown.lock().unwrap().push(uri.to_string());
        if !self.dismiss {
            std::future::pending::<()>().await;
        }
    }

    fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}
