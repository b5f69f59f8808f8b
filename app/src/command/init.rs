use parley_config::Config;

/// Strategy for writing the config template to `~/parley/config.json`.
///
/// Fails without touching the file when one already exists.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        Config::create_config()
    }
}
