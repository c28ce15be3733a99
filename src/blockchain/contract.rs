//! ERC-20 contract binding.
//!
//! The interface is generated by `sol!`; [`TokenContract`] routes the encoded
//! calls through [`BlockchainClient`] so every read shares its timeout and
//! failover handling.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

sol! {
    /// Standard ERC-20 token interface.
    #[derive(Debug)]
    interface IERC20 {
        event Transfer(address indexed from, address indexed to, uint256 value);
        event Approval(address indexed owner, address indexed spender, uint256 value);

        function name() external view returns (string memory);
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address recipient, uint256 amount) external returns (bool);
        function transferFrom(address sender, address recipient, uint256 amount) external returns (bool);
    }
}

/// An ERC-20 token deployed at a fixed address.
#[derive(Debug, Clone)]
pub struct TokenContract {
    address: Address,
    client: BlockchainClient,
}

impl TokenContract {
    pub fn new(address: Address, client: BlockchainClient) -> Self {
        Self { address, client }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Whether the node reports bytecode at the token address.
    pub async fn is_deployed(&self) -> BlockchainResult<bool> {
        let code = self.client.get_code(self.address).await?;
        Ok(!code.is_empty())
    }

    pub async fn name(&self) -> BlockchainResult<String> {
        self.read(IERC20::nameCall {}).await
    }

    pub async fn symbol(&self) -> BlockchainResult<String> {
        self.read(IERC20::symbolCall {}).await
    }

    pub async fn decimals(&self) -> BlockchainResult<u8> {
        self.read(IERC20::decimalsCall {}).await
    }

    pub async fn total_supply(&self) -> BlockchainResult<U256> {
        self.read(IERC20::totalSupplyCall {}).await
    }

    pub async fn balance_of(&self, account: Address) -> BlockchainResult<U256> {
        self.read(IERC20::balanceOfCall { account }).await
    }

    /// Amount `spender` may still move on behalf of `owner`.
    pub async fn allowance(&self, owner: Address, spender: Address) -> BlockchainResult<U256> {
        self.read(IERC20::allowanceCall { owner, spender }).await
    }

    /// Call data for `transfer(recipient, amount)`.
    pub fn transfer_calldata(recipient: Address, amount: U256) -> Bytes {
        IERC20::transferCall { recipient, amount }.abi_encode().into()
    }

    async fn read<C: SolCall>(&self, call: C) -> BlockchainResult<C::Return> {
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(call.abi_encode());

        let output = self.client.call(&tx).await?;

        C::abi_decode_returns(&output).map_err(|e| {
            BlockchainError::Contract(format!(
                "{} returned undecodable data: {}",
                C::SIGNATURE,
                e
            ))
        })
    }
}
