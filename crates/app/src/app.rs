//! Startup plumbing for the card table binaries: directory layout, the global
//! tracing subscriber and the Bevy app wrapper.

use paths::PathContext;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    Layer, filter::LevelFilter, filter::filter_fn, fmt, layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application identity. Constants only.
pub trait Application: Sized + 'static {
    const APP_ID: &'static str;
    const STUDIO: &'static str = "chicken105";
    const PROJECT_ID: &'static str = "card_table";
}

fn path_context_for<A: Application>() -> PathContext {
    // Im Debug-Build landet alles unter <workspace>/.out
    #[cfg(debug_assertions)]
    return PathContext::with_base_path(
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(".out"),
        A::STUDIO,
        A::PROJECT_ID,
        A::APP_ID,
    );
    #[cfg(not(debug_assertions))]
    return PathContext::new(A::STUDIO, A::PROJECT_ID, A::APP_ID);
}

/// Paths, version and the log worker of one run.
pub struct AppContext {
    path_context: PathContext,
    version: &'static str,
    log_file: PathBuf,
    /// Must outlive the application so buffered log lines get flushed.
    _log_guard: WorkerGuard,
}

impl AppContext {
    /// Creates the directories and this run's log file writer.
    fn open(
        path_context: PathContext,
        version: &'static str,
    ) -> Result<(Self, NonBlocking), BoxError> {
        path_context.ensure_directories()?;

        let log_file = path_context.log_file_now();
        let file_name = log_file
            .file_name()
            .ok_or("log file path has no file name")?;
        let appender = tracing_appender::rolling::never(path_context.logs_dir(), file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let context = Self {
            path_context,
            version,
            log_file,
            _log_guard: guard,
        };
        Ok((context, writer))
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn settings_file(&self) -> PathBuf {
        self.path_context.settings_file()
    }

    /// Log file written by this run.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

fn log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

fn install_tracing(file_writer: NonBlocking) -> Result<(), BoxError> {
    let level = log_level();
    let file_layer = fmt::Layer::default()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_filter(filter_fn(move |metadata| metadata.level() <= &level));
    let console_layer =
        fmt::Layer::default().with_filter(filter_fn(move |metadata| metadata.level() <= &level));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()?;
    Ok(())
}

/// Builder for applications with paths and logging set up.
pub struct AppBuilder<A: Application> {
    context: AppContext,
    _marker: PhantomData<A>,
}

impl<A: Application> AppBuilder<A> {
    /// Creates the directories and installs the global tracing subscriber
    /// (console plus a non-blocking per-run log file).
    pub fn new(version: &'static str) -> Result<Self, BoxError> {
        let (context, file_writer) = AppContext::open(path_context_for::<A>(), version)?;
        install_tracing(file_writer)?;
        Ok(Self {
            context,
            _marker: PhantomData,
        })
    }

    /// Bevy application. `configure` receives the fresh `App` by value and
    /// returns it configured.
    #[cfg(feature = "bevy")]
    pub fn build_with_bevy(
        self,
        configure: impl FnOnce(bevy::prelude::App, &AppContext) -> bevy::prelude::App,
    ) -> BevyApp<A> {
        let app = configure(bevy::prelude::App::new(), &self.context);
        BevyApp {
            _context: self.context,
            app,
            _marker: PhantomData,
        }
    }
}

/// Bevy app plus the context that keeps logging alive.
#[cfg(feature = "bevy")]
pub struct BevyApp<A: Application> {
    _context: AppContext,
    app: bevy::prelude::App,
    _marker: PhantomData<A>,
}

#[cfg(feature = "bevy")]
impl<A: Application> BevyApp<A> {
    pub fn run(&mut self) -> bevy::app::AppExit {
        self.app.run()
    }
}
