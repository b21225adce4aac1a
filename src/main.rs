#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use eframe::{egui, App, NativeOptions};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use comentarios::classifier::{RemoteClassifier, SentimentClassifier};
use comentarios::config::{self, Config};
use comentarios::export::with_csv_extension;
use comentarios::worker::{ClassificationJob, JobOutcome};
use comentarios::{CoreError, RecordStore};

#[derive(Parser, Debug)]
#[command(name = "comentarios", about = "Analiza comentarios y acumula un dataset de sentimiento")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: String,
    /// Default tracing filter, overridden by RUST_LOG.
    #[arg(long, default_value = "info")]
    log_level: String,
}

enum Status {
    Info(String),
    Warning(String),
    Error(String),
}

impl Status {
    fn from_error(err: &CoreError) -> Self {
        match err {
            CoreError::EmptyInput => {
                Status::Warning("Por favor, ingrese texto para analizar.".to_string())
            }
            CoreError::NothingToExport => {
                Status::Warning("No hay comentarios para descargar.".to_string())
            }
            CoreError::ClassificationUnavailable { reason } => {
                Status::Error(format!("No se pudo analizar el comentario: {}", reason))
            }
            CoreError::ExportWriteFailed { path, source } => Status::Error(format!(
                "No se pudo guardar el dataset en {}: {}",
                path.display(),
                source
            )),
        }
    }
}

struct ComentariosApp {
    config_error: Option<String>,
    classifier: Arc<dyn SentimentClassifier>,
    store: RecordStore,
    input: String,
    export_path: String,
    job: Option<ClassificationJob>,
    status: Option<Status>,
    last_result: Option<String>,
}

impl ComentariosApp {
    fn new(_cc: &eframe::CreationContext<'_>, config: Config, config_error: Option<String>) -> Self {
        let remote = config.remote_classifier(|name| std::env::var(name).ok());
        if remote.token.is_none() {
            info!(
                "No token found in ${}; calling the classifier anonymously",
                config.classifier.token_env
            );
        }
        Self::with_classifier(
            Arc::new(RemoteClassifier::new(remote)),
            config.export.default_path.display().to_string(),
            config_error,
        )
    }

    fn with_classifier(
        classifier: Arc<dyn SentimentClassifier>,
        export_path: String,
        config_error: Option<String>,
    ) -> Self {
        Self {
            config_error,
            classifier,
            store: RecordStore::new(),
            input: String::new(),
            export_path,
            job: None,
            status: None,
            last_result: None,
        }
    }

    fn analyze_and_save(&mut self) {
        if self.job.is_some() {
            return;
        }
        let raw = self.input.trim().to_string();
        match ClassificationJob::spawn(Arc::clone(&self.classifier), raw) {
            Ok(job) => {
                self.last_result = None;
                self.status = Some(Status::Info("Analizando...".to_string()));
                self.job = Some(job);
            }
            Err(err) => {
                self.last_result = None;
                self.status = Some(Status::from_error(&err));
            }
        }
    }

    fn poll_job(&mut self) {
        let Some(job) = &self.job else { return };
        let Some(outcome) = job.poll() else { return };
        let cancelled = matches!(outcome, JobOutcome::Cancelled);
        match job.commit(outcome, &mut self.store) {
            Ok(Some(record)) => {
                let level = record.label().depression_level();
                self.last_result = Some(format!("Nivel de depresión detectado: {}", level));
                self.status = Some(Status::Info(
                    "El comentario ha sido guardado exitosamente.".to_string(),
                ));
            }
            Ok(None) => {
                if cancelled {
                    self.status = Some(Status::Warning("Análisis cancelado.".to_string()));
                }
            }
            Err(err) => {
                error!("Analysis failed: {}", err);
                self.status = Some(Status::from_error(&err));
            }
        }
        self.job = None;
    }

    fn download_dataset(&mut self) {
        // Checked before the path so an empty session never touches the filesystem.
        if self.store.is_empty() {
            self.status = Some(Status::from_error(&CoreError::NothingToExport));
            return;
        }
        let path: PathBuf = with_csv_extension(self.export_path.trim());
        match self.store.export(&path) {
            Ok(()) => {
                self.status = Some(Status::Info(format!(
                    "El dataset se ha guardado en:\n{}",
                    path.display()
                )));
            }
            Err(err) => self.status = Some(Status::from_error(&err)),
        }
    }
}

impl App for ComentariosApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_job();
        if self.job.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        let busy = self.job.is_some();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(10.0);
                ui.label(
                    egui::RichText::new("Escribe uno o varios comentarios en el siguiente recuadro.")
                        .size(16.0),
                );
                if let Some(err) = &self.config_error {
                    ui.colored_label(egui::Color32::RED, format!("Config: {}", err));
                }
                ui.add_space(10.0);
                ui.add_enabled(
                    !busy,
                    egui::TextEdit::singleline(&mut self.input).desired_width(400.0),
                );
                ui.add_space(5.0);

                if ui.button("Borrar texto").clicked() {
                    self.input.clear();
                }
                ui.add_space(5.0);
                if ui
                    .add_enabled(!busy, egui::Button::new("Analizar y Guardar"))
                    .clicked()
                {
                    self.analyze_and_save();
                }
                if busy {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        if ui.button("Cancelar").clicked() {
                            if let Some(job) = &self.job {
                                job.cancel();
                            }
                        }
                    });
                }
                ui.add_space(10.0);

                ui.horizontal(|ui| {
                    ui.label("Guardar como:");
                    ui.text_edit_singleline(&mut self.export_path);
                });
                if ui.button("Descargar Dataset").clicked() {
                    self.download_dataset();
                }
                ui.separator();

                ui.label(format!("Comentarios guardados: {}", self.store.len()));
                if let Some(result) = &self.last_result {
                    ui.strong(result);
                }
                match &self.status {
                    Some(Status::Info(msg)) => {
                        ui.colored_label(egui::Color32::DARK_GREEN, msg);
                    }
                    Some(Status::Warning(msg)) => {
                        ui.colored_label(egui::Color32::from_rgb(200, 120, 0), msg);
                    }
                    Some(Status::Error(msg)) => {
                        ui.colored_label(egui::Color32::RED, msg);
                    }
                    None => {}
                }
            });
        });
    }
}

fn main() -> Result<(), eframe::Error> {
    let args = Args::parse();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .try_init();

    let (config, config_error) = match config::load_config_from_file(&args.config) {
        Ok(loaded) => (loaded, None),
        Err(err) => {
            error!("Error loading {}: {}", args.config, err);
            (Config::default(), Some(err.to_string()))
        }
    };

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([500.0, 300.0])
            .with_min_inner_size([400.0, 260.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Procesamiento de Texto",
        options,
        Box::new(move |cc| Box::new(ComentariosApp::new(cc, config, config_error))),
    )
}
