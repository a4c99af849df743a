use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use zeppelin_core::{Envelope, NoteResult, ParagraphResult, Status};
use zeppelin_logging::{zeppelin_debug, zeppelin_info, zeppelin_warn};

use crate::wait::poll_until;
use crate::{ApiRequest, AuthMode, ClientConfig, ClientError, Clock, ReqwestTransport, TokioClock, Transport};

/// Flat string parameters passed to a note or paragraph run.
pub type Parameters = BTreeMap<String, String>;

/// Whether a run call returns right after submission or only once the job
/// has reached a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Return the snapshot taken right after the server acknowledged the
    /// submission. The job may still be pending or running.
    Submit,
    /// Suspend the caller until the job finished, failed or was aborted.
    WaitForCompletion,
}

/// Low level client for the notebook REST API: note and paragraph CRUD,
/// execution, cancellation and result queries.
///
/// The client keeps no state between calls besides its configuration and
/// transport. It may be shared, but each wait loop is one logical flow and
/// is not coordinated with others.
pub struct ExecutionClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl ExecutionClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_parts(config, Arc::new(transport), Arc::new(TokioClock)))
    }

    pub fn with_parts(config: ClientConfig, transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            transport,
            clock,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn get_version(&self) -> Result<String, ClientError> {
        let envelope = self.call(ApiRequest::get(["version"])).await?;
        envelope
            .body
            .get("version")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .ok_or_else(|| missing("body.version"))
    }

    /// Reserve a session id for `interpreter`. No interpreter process is
    /// started until something runs in the session.
    pub async fn new_session(&self, interpreter: &str) -> Result<String, ClientError> {
        let envelope = self.call(ApiRequest::post(["session", interpreter])).await?;
        envelope.message.ok_or_else(|| missing("message"))
    }

    /// Stop the interpreter process bound to the session.
    pub async fn stop_session(&self, interpreter: &str, session_id: &str) -> Result<(), ClientError> {
        self.call(ApiRequest::delete(["session", interpreter, session_id]))
            .await?;
        Ok(())
    }

    /// Web UI of the session's interpreter, e.g. the Spark UI. `None` for
    /// interpreters without one.
    pub async fn get_session_web_url(&self, session_id: &str) -> Result<Option<String>, ClientError> {
        let envelope = self.call(ApiRequest::post(["session", session_id])).await?;
        Ok(envelope
            .body
            .get("weburl")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned))
    }

    /// Authenticate; the session cookie is kept by the transport. Only the
    /// HTTP status decides success.
    pub async fn login(&self, user_name: &str, password: &str) -> Result<(), ClientError> {
        let request = match self.config.auth_mode {
            AuthMode::Direct => ApiRequest::post(["login"]).with_json(json!({
                "userName": user_name,
                "password": password,
            })),
            AuthMode::KnoxGateway => {
                ApiRequest::get(Vec::<String>::new()).with_basic_auth(user_name, password)
            }
        };
        zeppelin_debug!("login as {user_name} ({:?})", self.config.auth_mode);
        self.transport.execute(request).await?;
        zeppelin_info!("logged in as {user_name}");
        Ok(())
    }

    /// Create an empty note at `note_path` and return its id.
    pub async fn create_note(
        &self,
        note_path: &str,
        default_interpreter_group: Option<&str>,
    ) -> Result<String, ClientError> {
        let request = ApiRequest::post(["notebook"]).with_json(note_body(note_path, default_interpreter_group));
        body_string(self.call(request).await?)
    }

    /// Copy note `source_note_id` to `note_path` and return the new id.
    pub async fn clone_note(
        &self,
        note_path: &str,
        source_note_id: &str,
        default_interpreter_group: Option<&str>,
    ) -> Result<String, ClientError> {
        let request = ApiRequest::post(["notebook", source_note_id])
            .with_json(note_body(note_path, default_interpreter_group));
        body_string(self.call(request).await?)
    }

    pub async fn delete_note(&self, note_id: &str) -> Result<(), ClientError> {
        self.call(ApiRequest::delete(["notebook", note_id])).await?;
        Ok(())
    }

    /// Append a paragraph and return its id.
    pub async fn add_paragraph(&self, note_id: &str, title: &str, text: &str) -> Result<String, ClientError> {
        let request = ApiRequest::post(["notebook", note_id, "paragraph"]).with_json(json!({
            "title": title,
            "text": text,
        }));
        body_string(self.call(request).await?)
    }

    pub async fn update_paragraph(
        &self,
        note_id: &str,
        paragraph_id: &str,
        title: &str,
        text: &str,
    ) -> Result<(), ClientError> {
        let request = ApiRequest::put(["notebook", note_id, "paragraph", paragraph_id]).with_json(json!({
            "title": title,
            "text": text,
        }));
        self.call(request).await?;
        Ok(())
    }

    /// Id of a paragraph to run the next piece of session code in. The server
    /// reuses paragraphs once the note holds `max_paragraph` of them.
    pub async fn next_session_paragraph(&self, note_id: &str, max_paragraph: u32) -> Result<String, ClientError> {
        let request = ApiRequest::post(["notebook", note_id, "paragraph", "next"])
            .with_query("maxParagraph", max_paragraph.to_string());
        let envelope = self.call(request).await?;
        envelope.message.ok_or_else(|| missing("message"))
    }

    /// Ask the server to cancel a paragraph. The paragraph is not guaranteed
    /// to be terminal when this returns, and running waits are unaffected.
    pub async fn cancel_paragraph(&self, note_id: &str, paragraph_id: &str) -> Result<(), ClientError> {
        self.call(ApiRequest::delete(["notebook", "job", note_id, paragraph_id]))
            .await?;
        zeppelin_info!("requested cancel of {note_id}/{paragraph_id}");
        Ok(())
    }

    pub async fn query_note_result(&self, note_id: &str) -> Result<NoteResult, ClientError> {
        let envelope = self.call(ApiRequest::get(["notebook", note_id])).await?;
        Ok(NoteResult::from_json(note_id, &envelope.body))
    }

    pub async fn query_paragraph_result(&self, note_id: &str, paragraph_id: &str) -> Result<ParagraphResult, ClientError> {
        let envelope = self
            .call(ApiRequest::get(["notebook", note_id, "paragraph", paragraph_id]))
            .await?;
        Ok(ParagraphResult::from_json(&envelope.body))
    }

    /// Run every paragraph of a note.
    ///
    /// With [`RunMode::WaitForCompletion`] the server holds the request open
    /// until the note is done; no client-side polling happens. Either way the
    /// returned snapshot is queried after the run request returns.
    pub async fn run_note(&self, note_id: &str, mode: RunMode, parameters: &Parameters) -> Result<NoteResult, ClientError> {
        let blocking = mode == RunMode::WaitForCompletion;
        let request = ApiRequest::post(["notebook", "job", note_id])
            .with_query("blocking", blocking.to_string())
            .with_query("isolated", "true")
            .with_json(params_body(parameters));
        zeppelin_info!("running note {note_id} (blocking: {blocking})");
        self.call(request).await?;
        self.query_note_result(note_id).await
    }

    /// Run a single paragraph.
    ///
    /// An empty `session_id` leaves interpreter selection to the note's
    /// binding mode. With [`RunMode::WaitForCompletion`] this polls through
    /// [`Self::wait_until_paragraph_finished`] without a limit.
    pub async fn run_paragraph(
        &self,
        note_id: &str,
        paragraph_id: &str,
        session_id: &str,
        parameters: &Parameters,
        mode: RunMode,
    ) -> Result<ParagraphResult, ClientError> {
        let request = ApiRequest::post(["notebook", "job", note_id, paragraph_id])
            .with_query("sessionId", session_id)
            .with_json(params_body(parameters));
        zeppelin_info!("running paragraph {note_id}/{paragraph_id} ({mode:?})");
        self.call(request).await?;

        match mode {
            RunMode::Submit => self.query_paragraph_result(note_id, paragraph_id).await,
            RunMode::WaitForCompletion => {
                self.wait_until_paragraph_finished(note_id, paragraph_id, None)
                    .await
            }
        }
    }

    /// Poll until the server reports the note as no longer running.
    pub async fn wait_until_note_finished(&self, note_id: &str, limit: Option<Duration>) -> Result<NoteResult, ClientError> {
        poll_until(
            self.clock.as_ref(),
            self.config.query_interval(),
            &format!("note {note_id}"),
            limit,
            || self.query_note_result(note_id),
            |note: &NoteResult| !note.is_running,
        )
        .await
    }

    /// Poll until the paragraph reaches `FINISHED`, `ERROR` or `ABORT`.
    pub async fn wait_until_paragraph_finished(
        &self,
        note_id: &str,
        paragraph_id: &str,
        limit: Option<Duration>,
    ) -> Result<ParagraphResult, ClientError> {
        poll_until(
            self.clock.as_ref(),
            self.config.query_interval(),
            &format!("paragraph {note_id}/{paragraph_id}"),
            limit,
            || self.query_paragraph_result(note_id, paragraph_id),
            |paragraph: &ParagraphResult| paragraph.status.is_terminal(),
        )
        .await
    }

    /// Poll until the paragraph is observed as `RUNNING`.
    ///
    /// Beware: a paragraph that passes through `RUNNING` to a terminal state
    /// between two polls is never observed running, and this then never
    /// returns. Wrap it in a deadline when that matters.
    pub async fn wait_until_paragraph_running(&self, note_id: &str, paragraph_id: &str) -> Result<ParagraphResult, ClientError> {
        poll_until(
            self.clock.as_ref(),
            self.config.query_interval(),
            &format!("paragraph {note_id}/{paragraph_id}"),
            None,
            || self.query_paragraph_result(note_id, paragraph_id),
            |paragraph: &ParagraphResult| paragraph.status == Status::Running,
        )
        .await
    }

    async fn call(&self, request: ApiRequest) -> Result<Envelope, ClientError> {
        let label = format!("{} {}", request.method, request.path());
        zeppelin_debug!("{label}");
        let raw = self.transport.execute(request).await?;
        let envelope = Envelope::parse(&raw)?;
        if !envelope.is_ok() {
            zeppelin_warn!(
                "{label} rejected with {}: {}",
                envelope.status,
                envelope.message.as_deref().unwrap_or_default()
            );
        }
        Ok(envelope.into_accepted()?)
    }
}

fn note_body(note_path: &str, default_interpreter_group: Option<&str>) -> Value {
    json!({
        "name": note_path,
        "defaultInterpreterGroup": default_interpreter_group.unwrap_or_default(),
    })
}

fn params_body(parameters: &Parameters) -> Value {
    json!({ "params": parameters })
}

fn body_string(envelope: Envelope) -> Result<String, ClientError> {
    envelope
        .body_str()
        .map(ToOwned::to_owned)
        .ok_or_else(|| missing("body"))
}

fn missing(field: &str) -> ClientError {
    ClientError::MalformedResponse(format!("response has no string {field}"))
}
