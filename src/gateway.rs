//! Супервизор: связывает источники, брокер и подписчиков.
//!
//! Запуск проходит в две фазы. [`Gateway::bind`] проверяет конфигурацию,
//! занимает порты и открывает радио: любая ошибка здесь фатальна.
//! [`Gateway::run`] запускает рабочие задачи и возвращает управление только
//! при фатальной ошибке одной из них.

use std::{net::SocketAddr, sync::Arc};

use tokio::{
    net::TcpListener,
    sync::mpsc,
    task::{JoinHandle, JoinSet},
};
use tracing::{error, info};

use crate::{
    aprs::Message,
    config::Settings,
    ingest::{run_feed, start_radio, FeedConfig, RadioConfig, RadioLink},
    network::{bind_http, serve_http, RepublishConfig, RepublishServer},
    notify::{build_delivery, load_notifiers_or_empty, DispatchConfig, Dispatcher, NotificationPipeline},
    pubsub::Broadcaster,
    reporter::{run_reporter, TracingInfoSink},
    GateError, GateResult, RadioError,
};

/// Ёмкость подписок конвейера уведомлений и журнала пакетов.
///
/// Канал tokio не может быть нулевой ёмкости; одна ячейка ближе всего к
/// небуферизованной передаче: медленный подписчик тормозит всю шину.
pub const UNBUFFERED: usize = 1;

type Worker = (&'static str, GateResult<()>);

/// Собранный, но ещё не запущенный шлюз.
pub struct Gateway {
    settings: Settings,
    input: mpsc::Sender<Message>,
    broadcaster: Broadcaster,
    bus: JoinHandle<()>,
    server: RepublishServer,
    http: Option<TcpListener>,
    feed: Option<FeedConfig>,
    radio: Option<(RadioLink, JoinHandle<Result<(), RadioError>>)>,
}

impl Gateway {
    /// Проверяет настройки и захватывает ресурсы.
    ///
    /// Ошибки: неверные настройки, отсутствие позывного или пароля при
    /// включённом APRS-IS, занятый порт, недоступный последовательный порт.
    pub async fn bind(settings: Settings) -> GateResult<Self> {
        settings.validate()?;

        let feed = if settings.feed_enabled() {
            let feed = FeedConfig::from_settings(&settings);
            feed.validate()?;
            Some(feed)
        } else {
            info!("APRS-IS feed disabled");
            None
        };

        let (input, rx) = mpsc::channel(settings.input_capacity);
        let (broadcaster, bus) = Broadcaster::spawn(rx);

        let server = RepublishServer::bind(
            &settings.listen,
            broadcaster.clone(),
            RepublishConfig::from_settings(&settings),
        )
        .await?;

        let http = if settings.http.is_empty() {
            info!("HTTP submission endpoint disabled");
            None
        } else {
            Some(bind_http(&settings.http).await?)
        };

        let radio = if settings.radio_enabled() {
            Some(start_radio(&RadioConfig::from_settings(&settings), input.clone())?)
        } else {
            info!("Radio disabled");
            None
        };

        Ok(Self {
            settings,
            input,
            broadcaster,
            bus,
            server,
            http,
            feed,
            radio,
        })
    }

    /// Адрес сервера ретрансляции.
    pub fn local_addr(&self) -> GateResult<SocketAddr> {
        Ok(self.server.local_addr()?)
    }

    /// Адрес HTTP-приёма, если он включён.
    pub fn http_addr(&self) -> Option<SocketAddr> {
        self.http.as_ref().and_then(|l| l.local_addr().ok())
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Подключает уже запущенное чтение радио вместо порта из настроек.
    ///
    /// Ошибка `reader` обрабатывается так же, как ошибка чтения порта:
    /// [`Gateway::run`] возвращает её как фатальную.
    pub fn with_radio(
        mut self,
        link: RadioLink,
        reader: JoinHandle<Result<(), RadioError>>,
    ) -> Self {
        if let Some((_, previous)) = self.radio.replace((link, reader)) {
            previous.abort();
        }
        self
    }

    /// Отправитель во входной канал брокера (для внешних источников).
    pub fn input(&self) -> mpsc::Sender<Message> {
        self.input.clone()
    }

    /// Запускает рабочие задачи и ждёт первую завершившуюся.
    ///
    /// Все задачи бесконечны, поэтому завершение любой из них является
    /// ошибкой; остальные задачи при этом отменяются.
    pub async fn run(self) -> GateResult<()> {
        let Self {
            settings,
            input,
            broadcaster,
            bus,
            server,
            http,
            feed,
            radio,
        } = self;

        let mut workers: JoinSet<Worker> = JoinSet::new();

        // Уведомления
        let notifiers = load_notifiers_or_empty(&settings.notifiers).await;
        let client = reqwest::Client::new();
        let targets = notifiers
            .iter()
            .map(|n| (n.clone(), build_delivery(n, &client)))
            .collect();
        let dispatcher = Dispatcher::new(targets, DispatchConfig::default());
        let pipeline = NotificationPipeline::new(
            notifiers,
            dispatcher,
            settings.dedup_ttl(),
            settings.sweep_interval(),
        );
        let subscription = broadcaster.subscribe(UNBUFFERED).await;
        workers.spawn(async move {
            pipeline.run(subscription).await;
            ("notification pipeline", Ok(()))
        });

        if settings.report_packets {
            let subscription = broadcaster.subscribe(UNBUFFERED).await;
            workers.spawn(async move {
                run_reporter(subscription).await;
                ("packet reporter", Ok(()))
            });
        }

        // Источники
        if let Some(feed) = feed {
            let tx = input.clone();
            workers.spawn(async move {
                let res = run_feed(feed, tx, Arc::new(TracingInfoSink)).await;
                ("APRS-IS feed", res.map_err(GateError::from))
            });
        }

        let (radio_link, radio_reader) = radio.unzip();
        if let Some(reader) = radio_reader {
            workers.spawn(async move {
                let res = match reader.await {
                    Ok(res) => res,
                    Err(_) => Err(RadioError::ReaderStopped),
                };
                ("radio", res.map_err(GateError::from))
            });
        }

        // Выходы
        workers.spawn(async move {
            server.run().await;
            ("republishing server", Ok(()))
        });

        if let Some(listener) = http {
            workers.spawn(async move {
                let res = serve_http(listener, radio_link).await;
                ("HTTP endpoint", res.map_err(GateError::from))
            });
        }

        workers.spawn(async move {
            let _ = bus.await;
            ("broadcaster", Ok(()))
        });

        info!(workers = workers.len(), "Gateway started");

        // Вход остаётся открытым, даже если ни один источник не включён.
        let _input = input;

        let result = match workers.join_next().await {
            Some(Ok((name, Ok(())))) => Err(GateError::WorkerStopped(name)),
            Some(Ok((name, Err(e)))) => {
                error!(worker = name, error = %e, "Fatal worker error");
                Err(e)
            }
            Some(Err(e)) => {
                error!(error = %e, "Worker panicked");
                Err(GateError::WorkerStopped("unknown"))
            }
            None => Ok(()),
        };

        workers.abort_all();
        result
    }
}
