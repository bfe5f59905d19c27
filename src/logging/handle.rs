use std::time::Duration;

use tracing_appender::non_blocking::WorkerGuard;

/// Владеет ресурсами журналирования на время работы процесса.
///
/// Перед выходом нужно вызвать [`LoggingHandle::shutdown`], чтобы
/// дописать буфер файлового журнала.
pub struct LoggingHandle {
    file_guard: Option<WorkerGuard>,
    flush_timeout: Duration,
    shut_down: bool,
}

impl LoggingHandle {
    pub fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self {
            file_guard,
            flush_timeout: Duration::from_secs(5),
            shut_down: false,
        }
    }

    /// Устанавливает таймаут сброса буфера при завершении.
    pub fn with_flush_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.flush_timeout = timeout;
        self
    }

    pub fn has_file_sink(&self) -> bool {
        self.file_guard.is_some()
    }

    /// Синхронное завершение: сбрасывает буфер файлового журнала.
    pub fn shutdown(mut self) {
        self.shut_down = true;
        tracing::info!("Logging shutdown");

        let start = std::time::Instant::now();
        drop(self.file_guard.take());

        let elapsed = start.elapsed();
        if elapsed > self.flush_timeout {
            eprintln!(
                "WARNING: Logging shutdown took {}ms (timeout: {}ms)",
                elapsed.as_millis(),
                self.flush_timeout.as_millis()
            );
        }
    }

    /// Завершение из async контекста: сброс выполняется в блокирующем
    /// потоке и ограничен `flush_timeout`.
    pub async fn shutdown_async(mut self) {
        self.shut_down = true;
        tracing::info!("Logging shutdown");

        let guard = self.file_guard.take();
        let timeout = self.flush_timeout;

        match tokio::time::timeout(timeout, tokio::task::spawn_blocking(move || drop(guard))).await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => eprintln!("Logging shutdown task panicked: {e}"),
            Err(_) => eprintln!(
                "WARNING: Logging shutdown exceeded timeout of {}ms",
                timeout.as_millis()
            ),
        }
    }
}

impl Drop for LoggingHandle {
    fn drop(&mut self) {
        if !self.shut_down && self.file_guard.is_some() {
            eprintln!(
                "WARNING: LoggingHandle dropped without explicit shutdown(). \
                 Some logs may be lost."
            )
        }
    }
}
