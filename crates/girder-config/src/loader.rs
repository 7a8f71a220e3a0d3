use std::path::Path;

use crate::GatewayConfig;

impl GatewayConfig {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
        Self::from_toml(&raw)
    }

    /// Parse configuration from a raw TOML string
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded = crate::env::expand_env(raw)
            .map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self =
            toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// A provider name appearing in a chain without a matching entry in
    /// the provider table is a configuration error, not a per-call
    /// failure, so it is rejected here.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_rates()?;
        self.validate_chains()?;
        Ok(())
    }

    fn validate_rates(&self) -> anyhow::Result<()> {
        for (name, provider) in &self.providers {
            if provider.rates.input_per_million < 0.0 || provider.rates.output_per_million < 0.0 {
                anyhow::bail!("provider '{name}' has negative cost rates");
            }
            if provider.model.is_empty() {
                anyhow::bail!("provider '{name}' has an empty model identifier");
            }
        }
        Ok(())
    }

    fn validate_chains(&self) -> anyhow::Result<()> {
        if self.routing.default_chain.is_empty() {
            anyhow::bail!("routing.default_chain must name at least one provider");
        }

        let check_chain = |origin: &str, chain: &[String]| -> anyhow::Result<()> {
            if chain.is_empty() {
                anyhow::bail!("{origin} has an empty provider chain");
            }
            for name in chain {
                if !self.providers.contains_key(name) {
                    anyhow::bail!("{origin} references unknown provider '{name}'");
                }
            }
            Ok(())
        };

        check_chain("routing.default_chain", &self.routing.default_chain)?;
        for (index, rule) in self.routing.rules.iter().enumerate() {
            check_chain(&format!("routing rule #{index}"), &rule.providers)?;
        }

        Ok(())
    }
}
