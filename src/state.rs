use std::path::{Path, PathBuf};

use crate::config::{default_config_path, Config};
use crate::data::loader::load_file;
use crate::data::model::DataTable;
use crate::figure::{build_figure, Figure};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Figure, series and file options; edited in place by the option trees.
    /// `config.file_options.filename` doubles as the data-file text field.
    pub config: Config,

    /// The imported data file, set once the path names an existing file.
    pub data_file: Option<PathBuf>,

    /// Loaded table (None until "Load data" or the first plot).
    pub data: Option<DataTable>,

    /// File options changed since the last load.
    pub needs_reload: bool,

    /// Option editors are enabled after a valid data file is imported.
    pub editors_enabled: bool,

    /// Open figure windows, one per figure name.
    pub figures: Vec<Figure>,

    /// Timestamped status log shown in the side panel.
    pub log: Vec<String>,

    pub show_about: bool,

    /// The exit confirmation dialog is up.
    pub confirm_exit: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            config: Config::default(),
            data_file: None,
            data: None,
            needs_reload: false,
            editors_enabled: false,
            figures: Vec::new(),
            log: Vec::new(),
            show_about: false,
            confirm_exit: false,
        }
    }
}

impl AppState {
    /// Append a timestamped entry to the status log.
    pub fn show_log(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        log::info!("{msg}");
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.log.push(format!("{stamp} : {msg}"));
    }

    fn show_error(&mut self, msg: String) {
        log::error!("{msg}");
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.log.push(format!("{stamp} : {msg}"));
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    // -- Data file ----------------------------------------------------------

    /// Take a path picked in the import dialog.
    pub fn import_file(&mut self, path: &Path) {
        self.config.file_options.filename = path.display().to_string();
        self.update_file_state();
    }

    /// Re-validate the data-file text. Any loaded data is dropped.
    pub fn update_file_state(&mut self) {
        let path = PathBuf::from(self.config.file_options.filename.trim());
        if path.is_file() {
            self.data_file = Some(path);
            self.editors_enabled = true;
            self.show_log("imported new data file");
        } else {
            self.data_file = None;
            self.show_log("invalid data file");
        }
        self.data = None;
    }

    /// The data-file text lost focus. Re-validate only when it no longer
    /// names the imported file, so loaded data survives a plain click-away.
    pub fn filename_edited(&mut self) {
        let current = Path::new(self.config.file_options.filename.trim());
        if self.data_file.as_deref() != Some(current) {
            self.update_file_state();
        }
    }

    /// File options changed; the next plot reloads the data.
    pub fn file_options_changed(&mut self) {
        self.needs_reload = true;
    }

    /// Load the data file with the current file options.
    pub fn load_data(&mut self) -> bool {
        let Some(path) = self.data_file.clone() else {
            self.show_log("import a valid data file first");
            return false;
        };

        match load_file(&path, &self.config.file_options) {
            Ok(table) => {
                let (rows, cols) = table.shape();
                self.show_log(format!("data loaded  [{rows}, {cols}]"));
                self.config.file_options.columns = cols;
                self.reset_text_positions(&table);
                self.data = Some(table);
                self.needs_reload = false;
                true
            }
            Err(e) => {
                self.show_error(format!("data load failed: {e:#}"));
                false
            }
        }
    }

    /// Move every annotation to the start of the x axis.
    fn reset_text_positions(&mut self, table: &DataTable) {
        let fig = &self.config.figure_options;
        let x0 = if fig.xaxiscnt {
            0.0
        } else {
            table.get(0, fig.xaxiscol).unwrap_or(0.0)
        };
        for series in &mut self.config.plot_options {
            series.textcoordx = x0;
        }
    }

    // -- Figures ------------------------------------------------------------

    /// Build and open the configured figure, replacing one of the same name.
    pub fn show_plots(&mut self) -> bool {
        if (self.data.is_none() || self.needs_reload) && !self.load_data() {
            self.show_log("plot failed");
            return false;
        }
        let Some(data) = &self.data else {
            return false;
        };

        match build_figure(&self.config, data) {
            Ok(figure) => {
                let name = figure.name.clone();
                self.figures.retain(|f| f.name != name);
                self.figures.push(figure);
                self.show_log(format!("showing figure  {name}"));
                true
            }
            Err(e) => {
                self.show_error(format!("plot failed: {e}"));
                false
            }
        }
    }

    pub fn close_plots(&mut self) {
        self.figures.clear();
        self.show_log("closed all figures");
    }

    // -- Configuration file -------------------------------------------------

    /// Suggested save location, or `None` (logged) when there is nothing to
    /// save because no data file was imported.
    pub fn config_save_target(&mut self) -> Option<PathBuf> {
        if self.data_file.is_none() {
            self.show_log("configuration unchanged");
            return None;
        }
        Some(default_config_path(self.data_file.as_deref()))
    }

    /// Directory the open-config dialog starts in.
    pub fn config_open_dir(&self) -> Option<PathBuf> {
        self.data_file
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
    }

    pub fn save_config(&mut self, path: &Path) -> bool {
        if self.data_file.is_none() {
            self.show_log("configuration unchanged");
            return false;
        }
        match self.config.save(path) {
            Ok(()) => {
                self.show_log("configuration saved");
                true
            }
            Err(e) => {
                self.show_error(format!("configuration save failed: {e:#}"));
                false
            }
        }
    }

    /// Replace all options with the document at `path`. On failure the
    /// current options are kept.
    pub fn load_config(&mut self, path: &Path) -> bool {
        match Config::load(path) {
            Ok(config) => {
                self.config = config;
                self.update_file_state();
                self.show_log("configuration loaded");
                true
            }
            Err(e) => {
                log::error!("loading {}: {e:#}", path.display());
                self.show_log("invalid configuration file");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Delimiter;

    fn data_dir() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nav.txt");
        std::fs::write(&path, "t a b\n100.0 1 2\n101.0 3 4\n102.0 5 6\n").unwrap();
        (dir, path)
    }

    fn last_log(state: &AppState) -> &str {
        let entry = state.log.last().map(String::as_str).unwrap_or("");
        entry.split_once(" : ").map(|(_, m)| m).unwrap_or(entry)
    }

    #[test]
    fn log_entries_are_timestamped() {
        let mut state = AppState::default();
        state.show_log("hello");
        let entry = &state.log[0];
        let (stamp, msg) = entry.split_once(" : ").unwrap();
        assert_eq!(msg, "hello");
        assert_eq!(stamp.len(), 8);
        assert_eq!(stamp.matches(':').count(), 2);
        state.clear_log();
        assert!(state.log.is_empty());
    }

    #[test]
    fn import_validates_path() {
        let (_dir, path) = data_dir();
        let mut state = AppState::default();

        state.import_file(Path::new("/definitely/not/here.txt"));
        assert_eq!(last_log(&state), "invalid data file");
        assert!(state.data_file.is_none());
        assert!(!state.editors_enabled);

        state.import_file(&path);
        assert_eq!(last_log(&state), "imported new data file");
        assert_eq!(state.data_file.as_deref(), Some(path.as_path()));
        assert!(state.editors_enabled);
    }

    #[test]
    fn reimport_drops_loaded_data() {
        let (_dir, path) = data_dir();
        let mut state = AppState::default();
        state.import_file(&path);
        assert!(state.load_data());
        assert!(state.data.is_some());

        state.update_file_state();
        assert_eq!(last_log(&state), "imported new data file");
        assert!(state.data.is_none());
    }

    #[test]
    fn unchanged_filename_keeps_loaded_data() {
        let (_dir, path) = data_dir();
        let mut state = AppState::default();
        state.import_file(&path);
        assert!(state.load_data());
        let logged = state.log.len();

        state.filename_edited();
        assert_eq!(state.log.len(), logged);
        assert!(state.data.is_some());

        state.config.file_options.filename.push_str(".old");
        state.filename_edited();
        assert_eq!(last_log(&state), "invalid data file");
        assert!(state.data_file.is_none());
        assert!(state.data.is_none());
    }

    #[test]
    fn load_requires_a_data_file() {
        let mut state = AppState::default();
        assert!(!state.load_data());
        assert_eq!(last_log(&state), "import a valid data file first");
        assert!(!state.show_plots());
        assert_eq!(last_log(&state), "plot failed");
    }

    #[test]
    fn load_updates_columns_and_text_positions() {
        let (_dir, path) = data_dir();
        let mut state = AppState::default();
        state.import_file(&path);
        state.config.file_options.header_rows = 1;
        state.file_options_changed();

        assert!(state.load_data());
        assert_eq!(last_log(&state), "data loaded  [3, 3]");
        assert_eq!(state.config.file_options.columns, 3);
        assert!(!state.needs_reload);
        assert!(state.config.plot_options.iter().all(|s| s.textcoordx == 100.0));

        state.config.figure_options.xaxiscnt = true;
        assert!(state.load_data());
        assert!(state.config.plot_options.iter().all(|s| s.textcoordx == 0.0));
    }

    #[test]
    fn load_failure_is_logged() {
        let (_dir, path) = data_dir();
        let mut state = AppState::default();
        state.import_file(&path);
        // Header row not skipped.
        assert!(!state.load_data());
        assert!(last_log(&state).starts_with("data load failed:"));
        assert!(state.data.is_none());
    }

    #[test]
    fn show_plots_loads_and_replaces_by_name() {
        let (_dir, path) = data_dir();
        let mut state = AppState::default();
        state.import_file(&path);
        state.config.file_options.header_rows = 1;

        assert!(state.show_plots());
        assert!(state.data.is_some());
        assert_eq!(last_log(&state), "showing figure  Figure 1");
        assert!(state.show_plots());
        assert_eq!(state.figures.len(), 1);

        state.config.figure_options.figure = "second".into();
        assert!(state.show_plots());
        assert_eq!(state.figures.len(), 2);

        state.close_plots();
        assert!(state.figures.is_empty());
        assert_eq!(last_log(&state), "closed all figures");
    }

    #[test]
    fn pending_reload_is_honoured() {
        let (_dir, path) = data_dir();
        let mut state = AppState::default();
        state.import_file(&path);
        state.config.file_options.header_rows = 1;
        assert!(state.load_data());

        state.config.file_options.delimiter = Delimiter::Comma;
        state.file_options_changed();
        assert!(!state.show_plots());
        assert_eq!(last_log(&state), "plot failed");
    }

    #[test]
    fn out_of_range_series_fails_the_plot() {
        let (_dir, path) = data_dir();
        let mut state = AppState::default();
        state.import_file(&path);
        state.config.file_options.header_rows = 1;
        state.config.plot_options[1].line = true;
        state.config.plot_options[1].yindex = 3;
        assert!(!state.show_plots());
        assert!(last_log(&state).starts_with("plot failed: data column 3 of series 2"));
        assert!(state.figures.is_empty());
    }

    #[test]
    fn save_is_refused_without_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::default();
        assert_eq!(state.config_save_target(), None);
        assert!(!state.save_config(&dir.path().join("x.yaml")));
        assert_eq!(last_log(&state), "configuration unchanged");
        assert!(!dir.path().join("x.yaml").exists());
    }

    #[test]
    fn config_round_trip_restores_options() {
        let (dir, path) = data_dir();
        let mut state = AppState::default();
        state.import_file(&path);
        assert_eq!(state.config_save_target(), Some(dir.path().join("tplots.yaml")));
        assert_eq!(state.config_open_dir(), Some(dir.path().to_path_buf()));

        state.config.figure_options.title = "Trajectory".into();
        state.config.file_options.header_rows = 1;
        let cfg_path = dir.path().join("tplots.yaml");
        assert!(state.save_config(&cfg_path));
        assert_eq!(last_log(&state), "configuration saved");

        let mut fresh = AppState::default();
        assert!(fresh.load_config(&cfg_path));
        assert_eq!(last_log(&fresh), "configuration loaded");
        assert_eq!(fresh.config, state.config);
        assert_eq!(fresh.data_file.as_deref(), Some(path.as_path()));
        assert!(fresh.show_plots());
    }

    #[test]
    fn bad_config_keeps_current_options() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, "plot_options: 7\n").unwrap();

        let mut state = AppState::default();
        state.config.figure_options.title = "keep me".into();
        assert!(!state.load_config(&bad));
        assert_eq!(last_log(&state), "invalid configuration file");
        assert_eq!(state.config.figure_options.title, "keep me");
    }

    #[test]
    fn config_with_missing_data_file_loads_without_it() {
        let (dir, path) = data_dir();
        let mut state = AppState::default();
        state.import_file(&path);
        let cfg_path = dir.path().join("tplots.yaml");
        assert!(state.save_config(&cfg_path));
        std::fs::remove_file(&path).unwrap();

        let mut fresh = AppState::default();
        assert!(fresh.load_config(&cfg_path));
        assert!(fresh.log.iter().any(|e| e.ends_with(" : invalid data file")));
        assert_eq!(last_log(&fresh), "configuration loaded");
        assert!(fresh.data_file.is_none());
    }
}
