mod shared;
mod utils;
mod validate;

use clap::Parser;
use simple_error::SimpleResult;

use self::shared::validate_and_fix_shared_settings;
pub use self::shared::SharedSettings;
use self::validate::validate_and_fix_validate_settings;
pub use self::validate::ValidateSettings;

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}"
)]
#[clap(rename_all = "kebab_case")]
pub struct Settings {
    #[command(flatten)]
    pub shared: SharedSettings,

    #[command(flatten)]
    pub validate: ValidateSettings,
}

/// Validate settings and update parameters that can't be processed by clap
///
fn validate_and_fix_settings_impl(mut settings: Settings) -> SimpleResult<Settings> {
    settings.shared = validate_and_fix_shared_settings(settings.shared)?;
    settings.validate = validate_and_fix_validate_settings(settings.validate)?;
    Ok(settings)
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes no logger has been configured yet
///
pub fn validate_and_fix_settings(settings: Settings) -> Settings {
    match validate_and_fix_settings_impl(settings) {
        Ok(x) => x,
        Err(msg) => {
            eprintln!("Invalid command-line setting: {msg}");
            std::process::exit(exitcode::USAGE);
        }
    }
}

pub fn parse_settings() -> Settings {
    Settings::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Settings::command().debug_assert();
    }
}
