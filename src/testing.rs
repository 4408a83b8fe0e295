//! In-process fakes for the RPC node, the signing device and the game API

use crate::contracts::ISlp;
use crate::error::{RpcError, SigningError};
use crate::rpc::{RoninRpc, TxReceipt};
use crate::signer::{DerivationPath, DeviceSignature, SigningDevice, UnsignedTransaction};
use alloy::consensus::{SignableTransaction, Transaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{address, keccak256, Address, Bytes, TxHash, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use alloy::sol_types::{SolCall, SolValue};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub(crate) const TEST_KEY: &str =
    "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

pub(crate) const RECIPIENT: Address = address!("1111111111111111111111111111111111111111");

/// SLP transfer of 5 tokens at nonce `nonce`
pub(crate) fn sample_tx(nonce: u64) -> UnsignedTransaction {
    let call = ISlp::transferCall {
        _to: RECIPIENT,
        _value: U256::from(5),
    };

    UnsignedTransaction {
        chain_id: 2020,
        to: crate::constants::SLP_CONTRACT,
        data: Bytes::from(call.abi_encode()),
        value: U256::ZERO,
        gas_limit: 246_437,
        gas_price: 1_000_000_000,
        nonce,
    }
}

pub(crate) fn success_receipt(hash: TxHash) -> TxReceipt {
    receipt(hash, true)
}

fn receipt(hash: TxHash, status: bool) -> TxReceipt {
    TxReceipt {
        transaction_hash: hash,
        status,
        block_number: Some(1),
        gas_used: 21_000,
    }
}

/// Scripted answer to a receipt request
#[derive(Debug, Clone)]
pub(crate) enum ReceiptStep {
    /// `Ok(None)`
    Missing,
    /// "receipts not found by ..." error
    NotIndexed,
    /// Receipt with the given status
    Mined(bool),
    Error(RpcError),
}

/// RPC request observed by [`FakeRpc`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RpcEvent {
    Nonce,
    /// Broadcast of a transaction whose calldata starts with this selector
    Send([u8; 4]),
    Receipt,
    Call([u8; 4]),
    Balance,
}

#[derive(Default)]
struct State {
    default_nonce: u64,
    nonces: VecDeque<u64>,
    receipts: VecDeque<ReceiptStep>,
    send_results: VecDeque<Result<(), RpcError>>,
    sent: Vec<Bytes>,
    events: Vec<RpcEvent>,
    responses: HashMap<[u8; 4], Bytes>,
    balance: U256,
    receipt_polls: usize,
}

/// Scripted RPC endpoint
///
/// Receipt requests consume the receipt queue in order and answer
/// [`ReceiptStep::Missing`] once it is empty.
pub(crate) struct FakeRpc {
    state: Mutex<State>,
}

impl FakeRpc {
    pub(crate) fn new(nonce: u64) -> Self {
        Self {
            state: Mutex::new(State {
                default_nonce: nonce,
                ..Default::default()
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Nonces answered before falling back to the default
    pub(crate) fn push_nonces(&self, nonces: impl IntoIterator<Item = u64>) {
        self.state().nonces.extend(nonces);
    }

    pub(crate) fn push_receipts(&self, steps: impl IntoIterator<Item = ReceiptStep>) {
        self.state().receipts.extend(steps);
    }

    /// Outcome of the next broadcast, `Ok` by default
    pub(crate) fn push_send_result(&self, result: Result<(), RpcError>) {
        self.state().send_results.push_back(result);
    }

    /// Answer view calls with this selector with `value`
    pub(crate) fn respond<T: SolValue>(&self, selector: [u8; 4], value: T) {
        self.state()
            .responses
            .insert(selector, Bytes::from(value.abi_encode()));
    }

    pub(crate) fn set_balance(&self, balance: U256) {
        self.state().balance = balance;
    }

    pub(crate) fn receipt_polls(&self) -> usize {
        self.state().receipt_polls
    }

    pub(crate) fn events(&self) -> Vec<RpcEvent> {
        self.state().events.clone()
    }

    /// Broadcast transactions, decoded
    pub(crate) fn sent(&self) -> Vec<TxEnvelope> {
        self.state()
            .sent
            .iter()
            .map(|raw| TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap())
            .collect()
    }

    /// Selectors of the broadcast transactions, in order
    pub(crate) fn sent_selectors(&self) -> Vec<[u8; 4]> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RpcEvent::Send(selector) => Some(selector),
                _ => None,
            })
            .collect()
    }
}

fn selector(data: &[u8]) -> [u8; 4] {
    let mut selector = [0u8; 4];
    let len = data.len().min(4);
    selector[..len].copy_from_slice(&data[..len]);
    selector
}

impl RoninRpc for FakeRpc {
    async fn get_transaction_count(&self, _address: Address) -> Result<u64, RpcError> {
        let mut state = self.state();
        state.events.push(RpcEvent::Nonce);
        let nonce = state.nonces.pop_front().unwrap_or(state.default_nonce);
        Ok(nonce)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, RpcError> {
        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref())
            .map_err(|e| RpcError::Rejected {
                code: -32000,
                message: e.to_string(),
            })?;

        let mut state = self.state();
        state.events.push(RpcEvent::Send(selector(envelope.input())));
        let hash = keccak256(&raw);
        state.sent.push(raw);

        match state.send_results.pop_front() {
            Some(Err(err)) => Err(err),
            _ => Ok(hash),
        }
    }

    async fn get_transaction_receipt(&self, hash: TxHash) -> Result<Option<TxReceipt>, RpcError> {
        let mut state = self.state();
        state.events.push(RpcEvent::Receipt);
        state.receipt_polls += 1;

        match state.receipts.pop_front().unwrap_or(ReceiptStep::Missing) {
            ReceiptStep::Missing => Ok(None),
            ReceiptStep::NotIndexed => Err(RpcError::classify(
                -32000,
                &format!("receipts not found by hash {}", hash),
            )),
            ReceiptStep::Mined(status) => Ok(Some(receipt(hash, status))),
            ReceiptStep::Error(err) => Err(err),
        }
    }

    async fn get_balance(&self, _address: Address) -> Result<U256, RpcError> {
        let mut state = self.state();
        state.events.push(RpcEvent::Balance);
        Ok(state.balance)
    }

    async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes, RpcError> {
        let mut state = self.state();
        let selector = selector(&data);
        state.events.push(RpcEvent::Call(selector));

        state
            .responses
            .get(&selector)
            .cloned()
            .ok_or_else(|| RpcError::Rejected {
                code: -32000,
                message: "execution reverted".to_string(),
            })
    }
}

/// Signing device backed by an in-memory key
pub(crate) struct FakeDevice {
    signer: PrivateKeySigner,
    pad_to: usize,
    reject: bool,
}

impl FakeDevice {
    pub(crate) fn new(key: &str) -> Self {
        Self {
            signer: key.trim_start_matches("0x").parse().unwrap(),
            pad_to: 32,
            reject: false,
        }
    }

    /// Return r and s left-padded with zeros to `width` bytes
    pub(crate) fn padded(mut self, width: usize) -> Self {
        self.pad_to = width;
        self
    }

    /// Refuse every request, like a device whose user pressed cancel
    pub(crate) fn rejecting(mut self) -> Self {
        self.reject = true;
        self
    }

    fn check(&self) -> Result<(), SigningError> {
        if self.reject {
            return Err(SigningError::Device("action cancelled by user".to_string()));
        }
        Ok(())
    }

    fn pad(&self, value: U256) -> Bytes {
        let bytes = value.to_be_bytes::<32>();
        let mut out = vec![0u8; self.pad_to.saturating_sub(32)];
        out.extend_from_slice(&bytes);
        Bytes::from(out)
    }
}

impl SigningDevice for FakeDevice {
    async fn get_address(&self, _path: &DerivationPath) -> Result<Address, SigningError> {
        self.check()?;
        Ok(self.signer.address())
    }

    async fn sign_transaction(
        &self,
        _path: &DerivationPath,
        tx: &UnsignedTransaction,
    ) -> Result<DeviceSignature, SigningError> {
        self.check()?;
        let legacy = TxLegacy {
            chain_id: Some(tx.chain_id),
            nonce: tx.nonce,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            to: TxKind::Call(tx.to),
            value: tx.value,
            input: tx.data.clone(),
        };
        let signature = self
            .signer
            .sign_hash_sync(&legacy.signature_hash())
            .map_err(|e| SigningError::Device(e.to_string()))?;

        Ok(DeviceSignature {
            v: u64::from(signature.v()) + 35 + 2 * tx.chain_id,
            r: self.pad(signature.r()),
            s: self.pad(signature.s()),
        })
    }

    async fn sign_message(
        &self,
        _path: &DerivationPath,
        message: &str,
    ) -> Result<Bytes, SigningError> {
        self.check()?;
        let signature = self
            .signer
            .sign_message_sync(message.as_bytes())
            .map_err(|e| SigningError::Device(e.to_string()))?;
        Ok(Bytes::from(signature.as_bytes().to_vec()))
    }
}

/// Request captured by [`MockServer`]
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lowercased
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// HTTP/1.1 server answering each connection with the next scripted
/// `(status, body)` pair, 404 once the script runs out
pub(crate) struct MockServer {
    url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    pub(crate) async fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        tokio::spawn(async move {
            let mut responses = VecDeque::from(responses);
            while let Ok((mut stream, _)) = listener.accept().await {
                let request = read_request(&mut stream).await;
                recorded.lock().unwrap().push(request);

                let (status, body) = responses.pop_front().unwrap_or((404, String::new()));
                let reason = reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("OK");
                let reply = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = stream.write_all(reply.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { url, requests }
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(stream: &mut TcpStream) -> RecordedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let mut header_end = None;

    loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if header_end.is_none() {
            header_end = buf.windows(4).position(|w| w == b"\r\n\r\n");
        }
        if let Some(end) = header_end {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }

    let end = header_end.unwrap_or(buf.len());
    let head = String::from_utf8_lossy(&buf[..end]).to_string();
    let body = String::from_utf8_lossy(buf.get(end + 4..).unwrap_or_default()).to_string();

    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    RecordedRequest {
        method,
        path,
        headers,
        body,
    }
}
