//! Transaction builder and typed transaction encodings

use ethkit_crypto::{keccak256, Signature};
use ethkit_primitives::{Address, H256, U256};
use ethkit_rlp::{encode_item, RlpItem};
use tracing::debug;

use crate::signer::Signer;
use crate::types::TransactionParams;
use crate::SdkError;

/// EIP-2718 type byte of dynamic-fee transactions
pub const EIP1559_TX_TYPE: u8 = 0x02;

/// One access-list entry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessListItem {
    /// Accessed contract
    pub address: Address,
    /// Accessed storage slots
    pub storage_keys: Vec<H256>,
}

impl AccessListItem {
    fn to_rlp(&self) -> RlpItem {
        RlpItem::List(vec![
            RlpItem::Bytes(self.address.as_bytes().to_vec()),
            RlpItem::List(
                self.storage_keys
                    .iter()
                    .map(|k| RlpItem::Bytes(k.as_bytes().to_vec()))
                    .collect(),
            ),
        ])
    }
}

fn to_rlp(to: &Option<Address>) -> RlpItem {
    match to {
        Some(address) => RlpItem::Bytes(address.as_bytes().to_vec()),
        None => RlpItem::empty(),
    }
}

fn signature_scalars(signature: &Signature) -> [RlpItem; 2] {
    [
        RlpItem::Uint(U256::from_big_endian(&signature.r)),
        RlpItem::Uint(U256::from_big_endian(&signature.s)),
    ]
}

/// A signed transaction ready for `eth_sendRawTransaction`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Network encoding
    pub raw: Vec<u8>,
    /// Transaction hash (keccak of `raw`)
    pub hash: H256,
    /// Signature over the signing hash
    pub signature: Signature,
}

impl SignedTransaction {
    fn new(raw: Vec<u8>, signature: Signature) -> Self {
        let hash = keccak256(&raw);
        Self { raw, hash, signature }
    }

    /// `0x`-prefixed raw encoding
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }
}

/// Type-2 (EIP-1559) transaction
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Eip1559Transaction {
    /// Chain ID
    pub chain_id: u64,
    /// Sender nonce
    pub nonce: u64,
    /// Tip per gas
    pub max_priority_fee_per_gas: U256,
    /// Fee cap per gas
    pub max_fee_per_gas: U256,
    /// Gas limit
    pub gas_limit: u64,
    /// Recipient (None for contract creation)
    pub to: Option<Address>,
    /// Value in wei
    pub value: U256,
    /// Input data
    pub data: Vec<u8>,
    /// Access list
    pub access_list: Vec<AccessListItem>,
}

impl Eip1559Transaction {
    fn fields(&self) -> Vec<RlpItem> {
        vec![
            RlpItem::from(self.chain_id),
            RlpItem::from(self.nonce),
            RlpItem::Uint(self.max_priority_fee_per_gas),
            RlpItem::Uint(self.max_fee_per_gas),
            RlpItem::from(self.gas_limit),
            to_rlp(&self.to),
            RlpItem::Uint(self.value),
            RlpItem::Bytes(self.data.clone()),
            RlpItem::List(self.access_list.iter().map(AccessListItem::to_rlp).collect()),
        ]
    }

    /// `0x02 || rlp([chainId, nonce, tip, feeCap, gas, to, value, data, accessList])`
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut out = vec![EIP1559_TX_TYPE];
        out.extend(encode_item(&RlpItem::List(self.fields())));
        out
    }

    /// Hash the signer signs
    pub fn signing_hash(&self) -> H256 {
        keccak256(self.signing_payload())
    }

    /// Signed network encoding: the payload list extended with `[yParity, r, s]`
    pub fn encode_signed(&self, signature: &Signature) -> Vec<u8> {
        let mut fields = self.fields();
        fields.push(RlpItem::from(signature.y_parity() as u64));
        fields.extend(signature_scalars(signature));

        let mut out = vec![EIP1559_TX_TYPE];
        out.extend(encode_item(&RlpItem::List(fields)));
        out
    }

    /// Sign with `signer`
    pub fn sign<S: Signer + ?Sized>(&self, signer: &S) -> Result<SignedTransaction, SdkError> {
        let signature = signer.sign_hash(&self.signing_hash())?;
        Ok(SignedTransaction::new(self.encode_signed(&signature), signature))
    }
}

/// Legacy transaction with EIP-155 replay protection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LegacyTransaction {
    /// Chain ID
    pub chain_id: u64,
    /// Sender nonce
    pub nonce: u64,
    /// Gas price
    pub gas_price: U256,
    /// Gas limit
    pub gas_limit: u64,
    /// Recipient (None for contract creation)
    pub to: Option<Address>,
    /// Value in wei
    pub value: U256,
    /// Input data
    pub data: Vec<u8>,
}

impl LegacyTransaction {
    fn fields(&self) -> Vec<RlpItem> {
        vec![
            RlpItem::from(self.nonce),
            RlpItem::Uint(self.gas_price),
            RlpItem::from(self.gas_limit),
            to_rlp(&self.to),
            RlpItem::Uint(self.value),
            RlpItem::Bytes(self.data.clone()),
        ]
    }

    /// EIP-155 hash: `keccak(rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0]))`
    pub fn signing_hash(&self) -> H256 {
        let mut fields = self.fields();
        fields.push(RlpItem::from(self.chain_id));
        fields.push(RlpItem::from(0u64));
        fields.push(RlpItem::from(0u64));
        keccak256(encode_item(&RlpItem::List(fields)))
    }

    /// `rlp([nonce, gasPrice, gas, to, value, data, v, r, s])` with `v = chainId * 2 + 35 + parity`
    pub fn encode_signed(&self, signature: &Signature) -> Vec<u8> {
        let v = U256::from(self.chain_id) * U256::from(2u64) + U256::from(35u64 + signature.y_parity() as u64);
        let mut fields = self.fields();
        fields.push(RlpItem::Uint(v));
        fields.extend(signature_scalars(signature));
        encode_item(&RlpItem::List(fields))
    }

    /// Sign with `signer`
    pub fn sign<S: Signer + ?Sized>(&self, signer: &S) -> Result<SignedTransaction, SdkError> {
        let signature = signer.sign_hash(&self.signing_hash())?;
        Ok(SignedTransaction::new(self.encode_signed(&signature), signature))
    }
}

/// Transaction builder with fluent API
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxBuilder {
    pub(crate) chain_id: u64,
    pub(crate) nonce: Option<u64>,
    pub(crate) gas_limit: Option<u64>,
    pub(crate) gas_price: Option<U256>,
    pub(crate) max_fee_per_gas: Option<U256>,
    pub(crate) max_priority_fee_per_gas: Option<U256>,
    pub(crate) to: Option<Address>,
    pub(crate) value: U256,
    pub(crate) data: Vec<u8>,
    pub(crate) access_list: Vec<AccessListItem>,
}

impl TxBuilder {
    /// Create a new transaction builder
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            ..Default::default()
        }
    }

    /// Set the nonce
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Set the gas limit
    pub fn gas_limit(mut self, limit: u64) -> Self {
        self.gas_limit = Some(limit);
        self
    }

    /// Set the gas price (for legacy transactions)
    pub fn gas_price(mut self, price: impl Into<U256>) -> Self {
        self.gas_price = Some(price.into());
        self
    }

    /// Set max fee per gas (for EIP-1559 transactions)
    pub fn max_fee_per_gas(mut self, fee: impl Into<U256>) -> Self {
        self.max_fee_per_gas = Some(fee.into());
        self
    }

    /// Set max priority fee per gas (for EIP-1559 transactions)
    pub fn max_priority_fee_per_gas(mut self, fee: impl Into<U256>) -> Self {
        self.max_priority_fee_per_gas = Some(fee.into());
        self
    }

    /// Set the recipient address
    pub fn to(mut self, address: Address) -> Self {
        self.to = Some(address);
        self
    }

    /// Set the value to transfer (in wei)
    pub fn value(mut self, value: impl Into<U256>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the input data
    pub fn data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }

    /// Add an access-list entry
    pub fn access(mut self, address: Address, storage_keys: Vec<H256>) -> Self {
        self.access_list.push(AccessListItem {
            address,
            storage_keys,
        });
        self
    }

    /// Chain ID the transaction is bound to
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Whether a legacy gas price was set without EIP-1559 fees
    pub fn is_legacy(&self) -> bool {
        self.gas_price.is_some() && self.max_fee_per_gas.is_none()
    }

    /// Params for gas estimation from `from`
    pub fn to_params(&self, from: &Address) -> TransactionParams {
        TransactionParams {
            from: Some(from.clone()),
            to: self.to.clone(),
            value: Some(self.value),
            data: (!self.data.is_empty()).then(|| self.data.clone()),
            ..Default::default()
        }
    }

    fn check_chain_id(&self) -> Result<(), SdkError> {
        if self.chain_id == 0 {
            return Err(SdkError::InvalidChainId(
                "Chain ID cannot be 0 - replay protection requires a valid chain ID".to_string(),
            ));
        }
        Ok(())
    }

    /// Build a legacy transaction (unsigned)
    pub fn build_legacy(&self) -> Result<LegacyTransaction, SdkError> {
        let nonce = self.nonce.ok_or(SdkError::MissingField("nonce".to_string()))?;
        let gas_limit = self.gas_limit.ok_or(SdkError::MissingField("gas_limit".to_string()))?;
        let gas_price = self.gas_price.ok_or(SdkError::MissingField("gas_price".to_string()))?;

        Ok(LegacyTransaction {
            chain_id: self.chain_id,
            nonce,
            gas_price,
            gas_limit,
            to: self.to.clone(),
            value: self.value,
            data: self.data.clone(),
        })
    }

    /// Build an EIP-1559 transaction (unsigned)
    pub fn build_eip1559(&self) -> Result<Eip1559Transaction, SdkError> {
        let nonce = self.nonce.ok_or(SdkError::MissingField("nonce".to_string()))?;
        let gas_limit = self.gas_limit.ok_or(SdkError::MissingField("gas_limit".to_string()))?;
        let max_fee = self
            .max_fee_per_gas
            .ok_or(SdkError::MissingField("max_fee_per_gas".to_string()))?;
        let max_priority = self
            .max_priority_fee_per_gas
            .ok_or(SdkError::MissingField("max_priority_fee_per_gas".to_string()))?;

        Ok(Eip1559Transaction {
            chain_id: self.chain_id,
            nonce,
            max_priority_fee_per_gas: max_priority,
            max_fee_per_gas: max_fee,
            gas_limit,
            to: self.to.clone(),
            value: self.value,
            data: self.data.clone(),
            access_list: self.access_list.clone(),
        })
    }

    /// Sign and build a legacy transaction
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required fields are missing (nonce, gas_limit, gas_price)
    /// - Chain ID is 0
    pub fn sign_legacy<S: Signer + ?Sized>(&self, signer: &S) -> Result<SignedTransaction, SdkError> {
        self.check_chain_id()?;
        let signed = self.build_legacy()?.sign(signer)?;
        debug!(hash = %signed.hash, "signed legacy transaction");
        Ok(signed)
    }

    /// Sign and build an EIP-1559 transaction
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required fields are missing (nonce, gas_limit, max fees)
    /// - Chain ID is 0
    pub fn sign_eip1559<S: Signer + ?Sized>(&self, signer: &S) -> Result<SignedTransaction, SdkError> {
        self.check_chain_id()?;
        let signed = self.build_eip1559()?.sign(signer)?;
        debug!(hash = %signed.hash, "signed EIP-1559 transaction");
        Ok(signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::{ReadOnlyAccount, Wallet};
    use ethkit_crypto::recover_address;
    use ethkit_rlp::decode_item;

    fn eip155_wallet() -> Wallet {
        Wallet::from_private_key(&[0x46u8; 32]).unwrap()
    }

    fn recipient() -> Address {
        Address::from_hex("0x3535353535353535353535353535353535353535").unwrap()
    }

    fn one_ether() -> U256 {
        U256::exp10(18)
    }

    #[test]
    fn test_eip155_reference_vector() {
        let builder = TxBuilder::new(1)
            .nonce(9)
            .gas_price(20_000_000_000u64)
            .gas_limit(21000)
            .to(recipient())
            .value(one_ether());

        let tx = builder.build_legacy().unwrap();
        assert_eq!(
            tx.signing_hash().to_hex(),
            "0xdaf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );

        let signed = builder.sign_legacy(&eip155_wallet()).unwrap();
        assert_eq!(
            hex::encode(&signed.raw),
            "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
        );
        assert_eq!(signed.hash, keccak256(&signed.raw));
    }

    #[test]
    fn test_eip1559_sign_layout() {
        let wallet = eip155_wallet();
        let builder = TxBuilder::new(1337)
            .nonce(0)
            .gas_limit(21000)
            .max_fee_per_gas(2_000_000_000u64)
            .max_priority_fee_per_gas(1_000_000_000u64)
            .to(recipient())
            .value(1000u64);

        let tx = builder.build_eip1559().unwrap();
        let signed = builder.sign_eip1559(&wallet).unwrap();
        assert_eq!(signed.raw[0], EIP1559_TX_TYPE);
        assert!(signed.raw_hex().starts_with("0x02"));

        let decoded = decode_item(&signed.raw[1..]).unwrap();
        let fields = decoded.as_list().unwrap();
        assert_eq!(fields.len(), 12);
        assert_eq!(fields[0].as_bytes().unwrap(), &[0x05, 0x39]);
        assert_eq!(fields[1].as_bytes().unwrap(), &[] as &[u8]);
        assert_eq!(fields[5].as_bytes().unwrap(), recipient().as_bytes());
        assert_eq!(fields[8].as_list().unwrap().len(), 0);

        let recovered = recover_address(&tx.signing_hash(), &signed.signature).unwrap();
        assert_eq!(&recovered, wallet.address());
    }

    #[test]
    fn test_signing_payload_prefix() {
        let tx = Eip1559Transaction {
            chain_id: 1,
            ..Default::default()
        };
        let payload = tx.signing_payload();
        assert_eq!(payload[0], 0x02);
        assert_eq!(decode_item(&payload[1..]).unwrap().as_list().unwrap().len(), 9);
    }

    #[test]
    fn test_access_list_encoding() {
        let tx = TxBuilder::new(1)
            .nonce(1)
            .gas_limit(50_000)
            .max_fee_per_gas(10u64)
            .max_priority_fee_per_gas(1u64)
            .access(recipient(), vec![H256::ZERO])
            .build_eip1559()
            .unwrap();
        let decoded = decode_item(&tx.signing_payload()[1..]).unwrap();
        let access = decoded.as_list().unwrap()[8].as_list().unwrap();
        assert_eq!(access.len(), 1);
        let entry = access[0].as_list().unwrap();
        assert_eq!(entry[0].as_bytes().unwrap(), recipient().as_bytes());
        assert_eq!(entry[1].as_list().unwrap()[0].as_bytes().unwrap(), &[0u8; 32]);
    }

    #[test]
    fn test_contract_creation_has_empty_to() {
        let tx = TxBuilder::new(1)
            .nonce(0)
            .gas_limit(100_000)
            .gas_price(1u64)
            .data(vec![0x60, 0x80])
            .build_legacy()
            .unwrap();
        let signed = tx.sign(&eip155_wallet()).unwrap();
        let decoded = decode_item(&signed.raw).unwrap();
        let fields = decoded.as_list().unwrap();
        assert_eq!(fields[3].as_bytes().unwrap(), &[] as &[u8]);
        assert_eq!(fields[5].as_bytes().unwrap(), &[0x60, 0x80]);
    }

    #[test]
    fn test_missing_fields() {
        let result = TxBuilder::new(1).gas_limit(21000).gas_price(1u64).build_legacy();
        assert!(matches!(result, Err(SdkError::MissingField(f)) if f == "nonce"));

        let result = TxBuilder::new(1).nonce(0).gas_limit(21000).build_eip1559();
        assert!(matches!(result, Err(SdkError::MissingField(f)) if f == "max_fee_per_gas"));
    }

    #[test]
    fn test_rejects_zero_chain_id() {
        let builder = TxBuilder::new(0)
            .nonce(0)
            .gas_limit(21000)
            .gas_price(1u64)
            .max_fee_per_gas(1u64)
            .max_priority_fee_per_gas(1u64);
        assert!(matches!(
            builder.sign_legacy(&eip155_wallet()),
            Err(SdkError::InvalidChainId(_))
        ));
        assert!(matches!(
            builder.sign_eip1559(&eip155_wallet()),
            Err(SdkError::InvalidChainId(_))
        ));
    }

    #[test]
    fn test_read_only_signer_cannot_sign() {
        let builder = TxBuilder::new(1).nonce(0).gas_limit(21000).gas_price(1u64);
        let account = ReadOnlyAccount::new(recipient());
        assert!(matches!(
            builder.sign_legacy(&account),
            Err(SdkError::Signer(_))
        ));
    }

    #[test]
    fn test_to_params() {
        let from = eip155_wallet().address().clone();
        let params = TxBuilder::new(1).to(recipient()).to_params(&from);
        assert_eq!(params.from, Some(from));
        assert!(params.data.is_none());
        assert_eq!(params.value, Some(U256::zero()));
    }
}
