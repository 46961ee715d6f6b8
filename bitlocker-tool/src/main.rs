mod cli;
mod paths;

use std::process::ExitCode;

use clap::Parser;
use diskpart::{Action, Session, SessionError, SessionOutcome, ShellLauncher};
use env_logger::Env;

use self::cli::Cli;

/// bitlocker-tool mount   0:1863:GiB 6:362:GiB X
/// bitlocker-tool unmount 0:1863:GiB 6:362:GiB X
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let selector = cli.selector();
    let config = cli.session_config();
    log::debug!("diskpart={:?}", config.tool.program);

    let session = Session::new(&config, ShellLauncher::elevated());
    let result = match Action::from(cli.action) {
        Action::Mount => session.mount(&selector).await,
        Action::Unmount => session.unmount(&selector).await,
    };

    match result {
        Ok(outcome) => ExitCode::from(outcome_code(outcome)),
        Err(err) => {
            log::error!("{err}");
            ExitCode::from(exit_code(&err))
        }
    }
}

/// diskpart提前正常退出时盘符未被改动，不算错误但要让调用者看得到
fn outcome_code(outcome: SessionOutcome) -> u8 {
    match outcome {
        SessionOutcome::Completed => 0,
        SessionOutcome::ToolExited => 14,
    }
}

/// 协议错误直接使用其判别值
fn exit_code(err: &SessionError) -> u8 {
    match err {
        SessionError::Step(step) => step.code(),
        SessionError::Timeout(_) => 10,
        SessionError::ProcessExitAnomaly { .. } => 11,
        SessionError::Spawn { .. } => 12,
        SessionError::Helper { .. } | SessionError::HelperTimeout { .. } => 13,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use diskpart::StepError;

    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            exit_code(&StepError::MismatchComputer.into()),
            exit_code(&StepError::Io.into()),
            exit_code(&SessionError::Timeout(Duration::from_secs(100))),
            exit_code(&SessionError::ProcessExitAnomaly { code: Some(1) }),
            exit_code(&SessionError::Spawn {
                program: "diskpart.exe".into(),
                source: std::io::ErrorKind::NotFound.into(),
            }),
        ];

        assert_eq!(codes, [1, 9, 10, 11, 12]);
    }

    #[test]
    fn early_tool_exit_has_its_own_code() {
        assert_eq!(outcome_code(SessionOutcome::Completed), 0);

        let early = outcome_code(SessionOutcome::ToolExited);
        assert_ne!(early, 0);
        assert!((1..=13).all(|code| code != early));
    }
}
