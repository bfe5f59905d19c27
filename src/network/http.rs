use axum::{extract::State, http::StatusCode, routing::get, Form, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    aprs::{body::ADDRESSEE_WIDTH, Message},
    ingest::RadioLink,
    ParseError, ServerError,
};

/// Назначение и путь исходящих сообщений.
pub const OUTBOUND_DESTINATION: &str = "APZGAT";
pub const OUTBOUND_PATH: &str = "WIDE1-1,WIDE2-1";

/// Поля формы: GET-запрос или POST `application/x-www-form-urlencoded`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub dest: String,
    #[serde(default)]
    pub msg: String,
}

/// Результат обработки формы.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent,
    NoMessage,
    NoRadio,
    Invalid,
    Failed,
}

#[derive(Clone)]
struct HttpState {
    radio: Option<RadioLink>,
}

impl SubmitOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "Message sent",
            Self::NoMessage => "No message",
            Self::NoRadio => "No radio",
            Self::Invalid => "Invalid message",
            Self::Failed => "Send failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Sent => StatusCode::OK,
            Self::NoMessage | Self::Invalid => StatusCode::BAD_REQUEST,
            Self::NoRadio => StatusCode::SERVICE_UNAVAILABLE,
            Self::Failed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Строит исходящее сообщение
/// `src>APZGAT,WIDE1-1,WIDE2-1::<dest, дополненный до 9>:<msg>`.
pub fn build_message(
    src: &str,
    dest: &str,
    msg: &str,
) -> Result<Message, ParseError> {
    format!(
        "{src}>{OUTBOUND_DESTINATION},{OUTBOUND_PATH}::{dest:<width$}:{msg}",
        width = ADDRESSEE_WIDTH
    )
    .parse()
}

/// Обрабатывает форму: проверяет поля и передаёт сообщение в эфир.
pub async fn submit(
    radio: Option<&RadioLink>,
    form: &Submission,
) -> SubmitOutcome {
    if form.msg.is_empty() {
        return SubmitOutcome::NoMessage;
    }
    let Some(radio) = radio else {
        return SubmitOutcome::NoRadio;
    };

    let message = match build_message(form.src.trim(), form.dest.trim(), &form.msg) {
        Ok(message) => message,
        Err(e) => {
            warn!(src = %form.src, dest = %form.dest, error = %e, "Rejected outbound message");
            return SubmitOutcome::Invalid;
        }
    };

    let radio = radio.clone();
    let packet = message.to_string();
    match tokio::task::spawn_blocking(move || radio.transmit(&message)).await {
        Ok(Ok(())) => {
            info!(packet = %packet, "Outbound message sent");
            SubmitOutcome::Sent
        }
        Ok(Err(e)) => {
            warn!(packet = %packet, error = %e, "Outbound message failed");
            SubmitOutcome::Failed
        }
        Err(e) => {
            warn!(packet = %packet, error = %e, "Radio transmit task failed");
            SubmitOutcome::Failed
        }
    }
}

async fn handle_submit(
    State(state): State<HttpState>,
    Form(form): Form<Submission>,
) -> (StatusCode, &'static str) {
    let outcome = submit(state.radio.as_ref(), &form).await;
    (outcome.status(), outcome.as_str())
}

/// Маршрутизатор: `GET /` (query) и `POST /` (form).
pub fn router(radio: Option<RadioLink>) -> Router {
    Router::new()
        .route("/", get(handle_submit).post(handle_submit))
        .with_state(HttpState { radio })
}

/// Занимает адрес HTTP-приёма.
pub async fn bind_http(addr: &str) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })
}

/// Обслуживает HTTP-приём до ошибки сервера.
pub async fn serve_http(
    listener: TcpListener,
    radio: Option<RadioLink>,
) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, radio = radio.is_some(), "HTTP submission endpoint listening");
    }
    axum::serve(listener, router(radio)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        io::{self, Write},
        sync::Arc,
    };

    use parking_lot::Mutex;

    use super::*;

    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn form(
        src: &str,
        dest: &str,
        msg: &str,
    ) -> Submission {
        Submission {
            src: src.into(),
            dest: dest.into(),
            msg: msg.into(),
        }
    }

    #[test]
    fn test_build_message_pads_addressee() {
        let m = build_message("KG6HWF", "N0CALL", "hi").unwrap();
        assert_eq!(m.to_string(), "KG6HWF>APZGAT,WIDE1-1,WIDE2-1::N0CALL   :hi");
        assert_eq!(m.body().addressed_message().unwrap().text(), "hi");
    }

    #[tokio::test]
    async fn test_submit_outcomes() {
        assert_eq!(submit(None, &form("A", "B", "")).await, SubmitOutcome::NoMessage);
        assert_eq!(submit(None, &form("A", "B", "hi")).await, SubmitOutcome::NoRadio);

        let sink = Sink::default();
        let radio = RadioLink::new(sink.clone());
        assert_eq!(
            submit(Some(&radio), &form("", "B", "hi")).await,
            SubmitOutcome::Invalid
        );
        assert!(sink.0.lock().is_empty());

        assert_eq!(
            submit(Some(&radio), &form("KG6HWF", "N0CALL", "hi")).await,
            SubmitOutcome::Sent
        );
        assert!(!sink.0.lock().is_empty());
    }

    /// Полный HTTP-цикл через `reqwest`.
    #[tokio::test]
    async fn test_http_roundtrip() {
        let listener = bind_http("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let sink = Sink::default();
        tokio::spawn(serve_http(listener, Some(RadioLink::new(sink.clone()))));

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("http://{addr}/"))
            .header("content-type", "application/x-www-form-urlencoded")
            .body("src=KG6HWF&dest=N0CALL&msg=hello")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(resp.text().await.unwrap(), "Message sent");

        let resp = client
            .get(format!("http://{addr}/?src=KG6HWF&dest=N0CALL"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.text().await.unwrap(), "No message");
    }
}
