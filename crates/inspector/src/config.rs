use {
    anyhow::{Context, Result, anyhow, ensure},
    model::{
        account::AccountId,
        auction::BASIS_POINTS,
        escrow::StageOffsets,
        token::{TokenInfo, TokenList},
    },
    serde::{Deserialize, Serialize},
    std::{collections::HashSet, path::Path},
    url::Url,
};

/// Deployment the tool talks about. Every section falls back to the NEAR
/// testnet deployment when omitted.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Configuration {
    #[serde(default)]
    pub network: Network,

    #[serde(default)]
    pub contracts: Contracts,

    /// Token metadata used to parse and render amounts.
    #[serde(default = "default_tokens")]
    pub tokens: Vec<TokenInfo>,

    /// Escrow stage offsets in seconds after deployment.
    #[serde(default)]
    pub timelocks: StageOffsets,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Network {
    pub network_id: String,
    pub node_url: Url,
    pub explorer_url: Url,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Contracts {
    pub fusion_order: AccountId,
    pub fusion_resolver: AccountId,
    pub escrow_factory: AccountId,
    /// Share of every fill's making amount the order contract keeps, in
    /// basis points.
    #[serde(default)]
    pub protocol_fee_bps: u32,
}

impl Configuration {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|err| anyhow!("failed to parse TOML config at {}: {err}", path.display()))
    }

    pub fn validate(self) -> Result<Self> {
        ensure!(
            self.contracts.protocol_fee_bps <= BASIS_POINTS,
            "protocol fee of {} basis points exceeds 100%",
            self.contracts.protocol_fee_bps
        );
        self.timelocks
            .validate()
            .context("invalid timelock stages")?;

        let mut ids = HashSet::new();
        let mut symbols = HashSet::new();
        for token in &self.tokens {
            ensure!(ids.insert(&token.id), "token {} is listed twice", token.id);
            ensure!(
                symbols.insert(&token.symbol),
                "token symbol {} is used twice",
                token.symbol
            );
        }
        Ok(self)
    }

    pub fn token_list(&self) -> TokenList {
        TokenList::new(self.tokens.iter().cloned())
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            network: Network::default(),
            contracts: Contracts::default(),
            tokens: default_tokens(),
            timelocks: StageOffsets::default(),
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Self {
            network_id: "testnet".to_owned(),
            node_url: Url::parse("https://rpc.testnet.near.org").unwrap(),
            explorer_url: Url::parse("https://explorer.testnet.near.org").unwrap(),
        }
    }
}

impl Default for Contracts {
    fn default() -> Self {
        Self {
            fusion_order: "fusion-order.testnet".parse().unwrap(),
            fusion_resolver: "fusion-resolver.testnet".parse().unwrap(),
            escrow_factory: "escrow-factory.testnet".parse().unwrap(),
            protocol_fee_bps: 0,
        }
    }
}

fn default_tokens() -> Vec<TokenInfo> {
    TokenList::testnet().all().into_iter().cloned().collect()
}
