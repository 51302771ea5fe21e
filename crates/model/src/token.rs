//! Static token metadata used to render amounts for humans. Decimals never
//! take part in settlement math.

use {
    crate::{account::AccountId, order::OrderData},
    alloy_primitives::U256,
    number::units::{format_units_trimmed, parse_units},
    serde::{Deserialize, Serialize},
    std::collections::HashMap,
};

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct TokenInfo {
    pub id: AccountId,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    #[serde(default)]
    pub icon: String,
}

impl TokenInfo {
    /// `amount` in whole tokens followed by the symbol, e.g. `1.5 USDC`.
    pub fn format(&self, amount: U256) -> String {
        format!(
            "{} {}",
            format_units_trimmed(amount, usize::from(self.decimals)),
            self.symbol
        )
    }

    pub fn parse(&self, amount: &str) -> anyhow::Result<U256> {
        parse_units(amount, self.decimals)
    }
}

#[derive(Clone, Debug, Default)]
pub struct TokenList {
    tokens: HashMap<AccountId, TokenInfo>,
}

impl TokenList {
    pub fn new(tokens: impl IntoIterator<Item = TokenInfo>) -> Self {
        Self {
            tokens: tokens
                .into_iter()
                .map(|token| (token.id.clone(), token))
                .collect(),
        }
    }

    /// Wrapped NEAR and the stable coins deployed on NEAR testnet.
    pub fn testnet() -> Self {
        let token = |id: &str, symbol: &str, name: &str, decimals, icon: &str| TokenInfo {
            id: id.parse().expect("valid account id"),
            symbol: symbol.to_owned(),
            name: name.to_owned(),
            decimals,
            icon: icon.to_owned(),
        };
        Self::new([
            token(
                "wrap.testnet",
                "wNEAR",
                "Wrapped NEAR",
                24,
                "https://assets.coingecko.com/coins/images/10365/small/near.jpg",
            ),
            token(
                "usdc.fakes.testnet",
                "USDC",
                "USD Coin",
                6,
                "https://assets.coingecko.com/coins/images/6319/small/USD_Coin_icon.png",
            ),
            token(
                "usdt.fakes.testnet",
                "USDT",
                "Tether USD",
                6,
                "https://assets.coingecko.com/coins/images/325/small/Tether.png",
            ),
        ])
    }

    pub fn get(&self, id: &AccountId) -> Option<&TokenInfo> {
        self.tokens.get(id)
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&TokenInfo> {
        self.tokens.values().find(|token| token.symbol == symbol)
    }

    /// Looks an asset up by id, falling back to its symbol since order forms
    /// sometimes refer to assets by ticker.
    pub fn resolve(&self, asset: &AccountId) -> Option<&TokenInfo> {
        self.get(asset).or_else(|| self.by_symbol(asset.as_str()))
    }

    /// All tokens sorted by symbol.
    pub fn all(&self) -> Vec<&TokenInfo> {
        let mut tokens: Vec<_> = self.tokens.values().collect();
        tokens.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        tokens
    }

    /// Formats `amount` of `asset`, or the raw amount and asset id for
    /// unknown tokens.
    pub fn format_amount(&self, asset: &AccountId, amount: U256) -> String {
        match self.resolve(asset) {
            Some(token) => token.format(amount),
            None => format!("{amount} {asset}"),
        }
    }

    /// One line summary of what an order swaps, e.g. `1.0 wNEAR → 1.0 USDC`.
    pub fn describe(&self, order: &OrderData) -> String {
        format!(
            "{} → {}",
            self.format_amount(&order.maker_asset, order.making_amount),
            self.format_amount(&order.taker_asset, order.taking_amount),
        )
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::order::tests::{account, order_data},
        serde_json::json,
    };

    #[test]
    fn describes_order_by_symbol() {
        let tokens = TokenList::testnet();
        let order = order_data();
        assert!(order.validate().is_ok());
        assert_eq!(tokens.describe(&order), "1.0 wNEAR → 1.0 USDC");
    }

    #[test]
    fn describes_order_by_id() {
        let tokens = TokenList::testnet();
        let order = OrderData {
            maker_asset: account("usdt.fakes.testnet"),
            taker_asset: account("wrap.testnet"),
            making_amount: U256::from(2_500_000),
            taking_amount: U256::from(5) * U256::from(10).pow(U256::from(23)),
            ..order_data()
        };
        assert_eq!(tokens.describe(&order), "2.5 USDT → 0.5 wNEAR");
    }

    #[test]
    fn unknown_tokens_fall_back_to_raw_amounts() {
        let tokens = TokenList::testnet();
        let order = OrderData {
            maker_asset: account("0x1234567890123456789012345678901234567890"),
            making_amount: U256::from(42),
            ..order_data()
        };
        assert_eq!(
            tokens.describe(&order),
            "42 0x1234567890123456789012345678901234567890 → 1.0 USDC"
        );
    }

    #[test]
    fn parses_human_amounts() {
        let tokens = TokenList::testnet();
        let usdc = tokens.by_symbol("USDC").unwrap();
        assert_eq!(usdc.parse("12.34").unwrap(), U256::from(12_340_000));
        assert!(usdc.parse("0.0000001").is_err());
    }

    #[test]
    fn lists_tokens_sorted() {
        let tokens = TokenList::testnet();
        let symbols: Vec<_> = tokens
            .all()
            .into_iter()
            .map(|token| token.symbol.as_str())
            .collect();
        assert_eq!(symbols, ["USDC", "USDT", "wNEAR"]);
    }

    #[test]
    fn deserializes_token_without_icon() {
        let token: TokenInfo = serde_json::from_value(json!({
            "id": "wrap.testnet",
            "symbol": "wNEAR",
            "name": "Wrapped NEAR",
            "decimals": 24,
        }))
        .unwrap();
        assert_eq!(token.icon, "");
        assert_eq!(
            TokenList::new([token]).get(&account("wrap.testnet")).map(|t| t.decimals),
            Some(24)
        );
    }
}
