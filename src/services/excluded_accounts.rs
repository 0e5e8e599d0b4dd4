// Exchange and LP wallets hold balances on behalf of many users, so they
// never count as a holder.
pub const EXCLUDED_OWNERS: &[&str] = &[
    "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1", //Raydium LP
    "u6PJ8DtQuPFnfmwHbGFULQ4u4EgjDiyYKjVEsynXq2w", // Gateio
    "A77HErqtfN1hLLpvZ9pCtu66FEtM8BveoaKbbMoZ4RiR", //bitget
    "HVh6wHNBAsG3pq1Bj5oCzRjoWKVogEDHwUHkRz3ekFgt", //Kucoin
    "ASTyfSima4LLAdDgoFGkgqoKowG1LZFDr9fAQrg7iaJZ", //MEXC
    "5PAhQiYdLBd6SVdjzBQDxUAEFyDdF5ExNPQfcscnPRj5", //MEXC #2
    "5tzFkiKscXHK5ZXCGbXZxdw7gTjjD1mBwuoFbhUvuAi9", //Binance #2
    "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM", //Binance #3
    "AC5RDfQFmDS1deWZos921JfqscXdByf8BKHs5ACWjtW2", //Bybit
    "FWznbcNXWQuHTawe9RxvQ2LdCENssh12dsznf4RiouN5", //Kraken
    "9un5wqE3q4oCjyrDkwsdD48KteCJitQX5978Vh7KKxHo", //OKX2
];

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    #[test]
    fn test_excluded_owners_are_valid_pubkeys() {
        for owner in EXCLUDED_OWNERS {
            assert!(Pubkey::from_str(owner).is_ok(), "{} is not a pubkey", owner);
        }
    }
}
