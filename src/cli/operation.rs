use super::error::{CliError, ResultExt};
use super::ui::Spinner;
use crate::print::Printer;
use crate::sdk::wait::WaitHandler;
use tokio_util::sync::CancellationToken;

/// Waits for a triggered backend operation unless the user asked for `--async`.
///
/// In async mode the handler is never built and `None` is returned. Otherwise
/// a spinner runs while the handler polls; a wait failure is wrapped in `context`.
pub async fn wait_unless_async<W, F>(
    p: &Printer,
    async_mode: bool,
    cancel: &CancellationToken,
    message: &str,
    make_handler: F,
    context: &str,
) -> Result<Option<W::Output>, CliError>
where
    W: WaitHandler,
    F: FnOnce() -> W,
{
    if async_mode {
        return Ok(None);
    }

    let mut handler = make_handler();
    let spinner = Spinner::start(p, message);
    match handler.wait_with_context(cancel).await {
        Ok(out) => {
            spinner.stop();
            Ok(Some(out))
        }
        Err(e) => {
            spinner.stop_with_error();
            Err(e).context(context)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::buffered_printer;
    use crate::sdk::wait::{OperationState, WaitError};
    use async_trait::async_trait;
    use std::cell::Cell;

    struct Fixed(Option<Result<&'static str, WaitError>>);

    #[async_trait]
    impl WaitHandler for Fixed {
        type Output = &'static str;

        async fn wait_with_context(
            &mut self,
            cancel: &CancellationToken,
        ) -> Result<&'static str, WaitError> {
            if cancel.is_cancelled() {
                return Err(WaitError::Cancelled);
            }
            self.0.take().unwrap_or(Err(WaitError::Cancelled))
        }
    }

    #[tokio::test]
    async fn async_mode_never_builds_the_handler() {
        let (p, _, err) = buffered_printer("");
        let built = Cell::new(0);
        let out = wait_unless_async(
            &p,
            true,
            &CancellationToken::new(),
            "Creating instance",
            || {
                built.set(built.get() + 1);
                Fixed(Some(Ok("done")))
            },
            "wait for creation",
        )
        .await
        .unwrap();
        assert_eq!(out, None);
        assert_eq!(built.get(), 0);
        assert_eq!(err.contents(), "");
    }

    #[tokio::test]
    async fn sync_mode_waits_once() {
        let (p, _, err) = buffered_printer("");
        let built = Cell::new(0);
        let out = wait_unless_async(
            &p,
            false,
            &CancellationToken::new(),
            "Creating instance",
            || {
                built.set(built.get() + 1);
                Fixed(Some(Ok("done")))
            },
            "wait for creation",
        )
        .await
        .unwrap();
        assert_eq!(out, Some("done"));
        assert_eq!(built.get(), 1);
        assert_eq!(err.contents(), "Creating instance...\nCreating instance: done\n");
    }

    #[tokio::test]
    async fn failures_are_wrapped_and_cancellation_is_an_interrupt() {
        let (p, _, _) = buffered_printer("");
        let err = wait_unless_async(
            &p,
            false,
            &CancellationToken::new(),
            "Deleting instance",
            || {
                Fixed(Some(Err(WaitError::Failed {
                    state: OperationState::Failed,
                    message: "boom".into(),
                })))
            },
            "wait for PostgreSQL Flex instance deletion",
        )
        .await
        .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("wait for PostgreSQL Flex instance deletion: "));

        let token = CancellationToken::new();
        token.cancel();
        let err = wait_unless_async(&p, false, &token, "Deleting instance", || Fixed(None), "x")
            .await
            .unwrap_err();
        assert!(err.is_interrupted());
    }
}
