use anyhow::Result;
use async_trait::async_trait;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_filter::{Memcmp, MemcmpEncodedBytes},
};
use solana_sdk::{
    account::Account,
    program_pack::Pack,
    pubkey::Pubkey,
};
use solana_account_decoder::UiAccountEncoding;
use spl_token::state::Account as TokenAccount;
use std::sync::Arc;
use std::str::FromStr;
use std::collections::HashSet;
use rayon::prelude::*;
use crate::types::models::Token;
use super::excluded_accounts::EXCLUDED_OWNERS;
use super::Limiter;

/// A per-token lookup that fills in attributes the source left out.
#[async_trait]
pub trait TokenEnricher: Send + Sync {
    fn name(&self) -> &'static str;

    async fn enrich_token(&self, token: &mut Token) -> Result<(), anyhow::Error>;
}

/// Replaces the source's holder figure with the number of distinct wallets
/// holding a positive balance, as seen by `getProgramAccounts`.
pub struct RpcHolderEnricher {
    client: Arc<RpcClient>,
    rate_limiter: Arc<Limiter>,
    excluded: HashSet<Pubkey>,
}

impl RpcHolderEnricher {
    pub fn new(client: Arc<RpcClient>, rate_limiter: Arc<Limiter>) -> Self {
        let excluded = EXCLUDED_OWNERS
            .iter()
            .filter_map(|owner| Pubkey::from_str(owner).ok())
            .collect();

        Self {
            client,
            rate_limiter,
            excluded,
        }
    }

    pub async fn holder_count(&self, mint_address: &str) -> Result<u64, anyhow::Error> {
        let mint_pubkey = Pubkey::from_str(mint_address)?;
        let config = solana_client::rpc_config::RpcProgramAccountsConfig {
            filters: Some(vec![
                solana_client::rpc_filter::RpcFilterType::Memcmp(Memcmp::new(
                    0,
                    MemcmpEncodedBytes::Base58(mint_pubkey.to_string()),
                )),
                solana_client::rpc_filter::RpcFilterType::DataSize(TokenAccount::LEN as u64),
            ]),
            account_config: solana_client::rpc_config::RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                ..Default::default()
            },
            with_context: None,
        };

        self.rate_limiter.until_ready().await;
        let accounts = self.client.get_program_accounts_with_config(&spl_token::ID, config).await?;
        tracing::debug!("Found {} token accounts for {}", accounts.len(), mint_address);

        Ok(count_holders(accounts, &self.excluded))
    }
}

/// Distinct owners of initialized accounts with a positive balance, minus
/// known exchange and LP wallets.
pub fn count_holders(accounts: Vec<(Pubkey, Account)>, excluded: &HashSet<Pubkey>) -> u64 {
    let owners: HashSet<Pubkey> = accounts
        .into_par_iter()
        .filter_map(|(_, account)| {
            TokenAccount::unpack(&account.data).ok()
                .filter(|token_account| {
                    token_account.amount > 0 &&
                    token_account.state == spl_token::state::AccountState::Initialized
                })
                .map(|token_account| token_account.owner)
        })
        .filter(|owner| !excluded.contains(owner))
        .collect();

    owners.len() as u64
}

#[async_trait]
impl TokenEnricher for RpcHolderEnricher {
    fn name(&self) -> &'static str {
        "rpc-holders"
    }

    async fn enrich_token(&self, token: &mut Token) -> Result<(), anyhow::Error> {
        let holders = self.holder_count(&token.mint).await?;
        tracing::debug!("{} ({}) has {} holders", token.symbol, token.mint, holders);
        token.holders = holders;
        Ok(())
    }
}
