use chrono::Local;
use std::collections::HashMap;
use tracing::{debug, error, info, trace};

use storerate::column::Cell;
use storerate::dataset::{Dataset, ROLE_OWNER, ROLE_USER};
use storerate::domain::{AppConfig, CmdMode, HELP_TEXT, Message, StoreError};
use storerate::rating::{PlatformStats, RatingSummary, initials, recent, recent_summary};
use storerate::rating_input::RatingInput;
use storerate::record::Record;
use storerate::table::{DataTable, RowAction, TableActions, ViewState};

use crate::inputter::{InputResult, Inputter};
use crate::ui::{STATUSLINE_HEIGHT, TABLE_CHROME_HEIGHT, TABS_HEIGHT};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    CMDINPUT,
    RATING,
    POPUP,
}

pub const TAB_TITLES: [&str; 4] = ["Users", "Stores", "Ratings", "Store Dashboard"];
const STORES_TAB: usize = 1;
const RATINGS_TAB: usize = 2;
const DASHBOARD_TAB: usize = 3;
const TAB_NOUNS: [&str; 3] = ["users", "stores", "ratings"];

#[derive(Debug, Default, Clone, Copy)]
struct Cursor {
    row: usize,    // Selected row, relative to offset
    offset: usize, // First view row on screen
    column: usize,
}

pub struct TableData {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub selected_row: usize,
    pub selected_column: usize,
    pub abs_selected_row: usize,
    pub nrows: usize,
    pub summary: String,
    pub filter_label: Option<String>,
    pub search: String,
    /// Active field scoped terms as (label, term)
    pub field_terms: Vec<(String, String)>,
    pub filtered_summary: Option<String>,
    pub actions: String,
    pub no_data: bool,
}

pub struct RatingPanel {
    pub store_name: String,
    pub prompt: &'static str,
    pub shown: u8,
    pub committed_badge: Option<String>,
    pub can_submit: bool,
}

pub struct ReviewLine {
    pub initials: String,
    pub author: String,
    pub date: String,
    pub value: u8,
    pub comment: Option<String>,
}

pub struct DashboardData {
    pub store_name: String,
    pub summary: RatingSummary,
    pub recent: Vec<ReviewLine>,
    pub recent_note: Option<String>,
    pub stats: PlatformStats,
}

pub struct UIData {
    pub selected_tab: usize,
    pub table: Option<TableData>,
    pub dashboard: Option<DashboardData>,
    pub rating: Option<RatingPanel>,
    pub popup: Option<&'static str>,
    pub cmdinput: Option<InputResult>,
    pub cmd_prompt: String,
    pub status_message: String,
}

/// Collects row action notifications for the status line.
#[derive(Default)]
struct ActionLog {
    messages: Vec<String>,
}

fn describe(record: &Record) -> String {
    record
        .get_string("name")
        .or_else(|| record.get_string("userName"))
        .or_else(|| record.id())
        .unwrap_or_else(|| "?".to_string())
}

impl TableActions for ActionLog {
    fn on_view(&mut self, record: &Record) {
        self.messages.push(format!("Viewing {}", describe(record)));
    }

    fn on_edit(&mut self, record: &Record) {
        self.messages.push(format!("Edit requested for {}", describe(record)));
    }

    fn on_delete(&mut self, record: &Record) {
        self.messages.push(format!("Delete requested for {}", describe(record)));
    }
}

pub struct Model {
    config: AppConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    dataset: Dataset,
    tables: Vec<DataTable>,
    cursors: Vec<Cursor>,
    tab: usize,
    rater: Option<String>,
    owner_store: Option<String>,
    rating_inputs: HashMap<String, RatingInput>,
    active_rating: Option<String>,
    input: Inputter,
    cmd_mode: Option<CmdMode>,
    last_input: InputResult,
    search_before_input: String,
    active_cmdinput: bool,
    status_message: String,
    table_height: usize,
}

impl Model {
    pub fn init(
        config: &AppConfig,
        dataset: Dataset,
        _ui_width: usize,
        ui_height: usize,
    ) -> Result<Self, StoreError> {
        let tables = vec![
            dataset.users_table()?,
            dataset.stores_table()?,
            dataset.ratings_table()?,
        ];
        // Ratings are submitted as the first normal user; the dashboard shows the first owner's store.
        let rater = dataset.users_with_role(ROLE_USER).next().and_then(|u| u.id());
        let owner_store = dataset
            .users_with_role(ROLE_OWNER)
            .filter_map(|u| u.id())
            .find_map(|id| dataset.store_owned_by(&id).and_then(|s| s.id()))
            .or_else(|| dataset.stores.first().and_then(|s| s.id()));
        info!("Rating as user {rater:?}, dashboard for store {owner_store:?}");

        Ok(Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            dataset,
            cursors: vec![Cursor::default(); tables.len()],
            tables,
            tab: 0,
            rater,
            owner_store,
            rating_inputs: HashMap::new(),
            active_rating: None,
            input: Inputter::default(),
            cmd_mode: None,
            last_input: InputResult::default(),
            search_before_input: String::new(),
            active_cmdinput: false,
            status_message: "Started storerate! Press ? for help".to_string(),
            table_height: Self::table_height_for(ui_height),
        })
    }

    fn table_height_for(ui_height: usize) -> usize {
        ui_height
            .saturating_sub(TABS_HEIGHT + STATUSLINE_HEIGHT + TABLE_CHROME_HEIGHT)
            .max(1)
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn is_rating(&self) -> bool {
        self.modus == Modus::RATING
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn current_table(&self) -> Option<&DataTable> {
        self.tables.get(self.tab)
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), StoreError> {
        let Some(msg) = message else {
            return Ok(());
        };
        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_selection_up(1),
                Message::MoveDown => self.move_selection_down(1),
                Message::MovePageUp => self.move_selection_up(self.table_height),
                Message::MovePageDown => self.move_selection_down(self.table_height),
                Message::MoveBeginning => self.move_selection_beginning(),
                Message::MoveEnd => self.move_selection_end(),
                Message::MoveLeft => self.move_column(false),
                Message::MoveRight => self.move_column(true),
                Message::NextTab => self.switch_tab(true),
                Message::PreviousTab => self.switch_tab(false),
                Message::Search => self.enter_cmd_mode(CmdMode::Search),
                Message::FieldSearch(idx) => self.enter_cmd_mode(CmdMode::FieldSearch(idx)),
                Message::ClearFilters => self.clear_filters(),
                Message::CycleFilter => self.cycle_filter(),
                Message::ClearFilter => self.clear_filter(),
                Message::Sort => self.sort_current_column(),
                Message::View => self.trigger_action(RowAction::View),
                Message::Edit => self.trigger_action(RowAction::Edit),
                Message::Delete => self.trigger_action(RowAction::Delete),
                Message::Rate | Message::Enter => self.begin_rating(),
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::RATING => match msg {
                Message::Quit => self.quit(),
                Message::Star(n) => self.select_star(n),
                Message::Enter => self.submit_rating(),
                Message::Exit => self.cancel_rating(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Help | Message::Enter => self.exit_popup(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::CMDINPUT => match msg {
                Message::RawKey(key) => self.raw_input(key),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
        }
        Ok(())
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!("UI was resized! w:{width}, h:{height}");
        self.table_height = Self::table_height_for(height);
        self.clamp_cursor();
    }

    // -------------------- Control handling functions ---------------------- //

    fn switch_tab(&mut self, forward: bool) {
        let ntabs = TAB_TITLES.len();
        self.tab = if forward {
            (self.tab + 1) % ntabs
        } else {
            (self.tab + ntabs - 1) % ntabs
        };
        trace!("Switched to tab {}", TAB_TITLES[self.tab]);
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn exit_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
    }

    fn enter_cmd_mode(&mut self, mode: CmdMode) {
        let Some(table) = self.current_table() else {
            return;
        };
        let before = match mode {
            CmdMode::Search if table.is_searchable() => table.config().search_term.clone(),
            CmdMode::Search => {
                self.set_status_message("This table is not searchable");
                return;
            }
            CmdMode::FieldSearch(idx) => match table.field_searches().get(idx) {
                Some(fs) => table.field_term(&fs.field).to_string(),
                None => {
                    self.set_status_message("No field search on this table");
                    return;
                }
            },
        };
        trace!("Entering command mode {mode:?} ...");
        self.search_before_input = before;
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);
        self.active_cmdinput = true;
        self.input.clear();
        self.input.set(&self.search_before_input);
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        if !self.active_cmdinput {
            return;
        }
        self.last_input = self.input.read(key);
        if self.last_input.finished {
            self.handle_cmd_input();
        } else {
            // Search as you type
            let term = self.last_input.input.clone();
            self.apply_term(&term);
        }
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {}", self.last_input.input);
        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;

        if self.cmd_mode.is_none() {
            info!("Cmd mode is none!");
            return;
        }
        let term = if self.last_input.canceled {
            self.search_before_input.clone()
        } else {
            self.last_input.input.clone()
        };
        self.apply_term(&term);
        if let Some(summary) = self.view_summary() {
            self.set_status_message(summary);
        }
        self.cmd_mode = None;
    }

    /// Route the prompt's text to the search the prompt was opened for.
    fn apply_term(&mut self, term: &str) {
        let Some(table) = self.tables.get_mut(self.tab) else {
            return;
        };
        match self.cmd_mode {
            Some(CmdMode::Search) => table.set_search(term),
            Some(CmdMode::FieldSearch(idx)) => {
                if let Some(field) = table.field_searches().get(idx).map(|f| f.field.clone()) {
                    table.set_field_term(&field, term);
                }
            }
            None => return,
        }
        self.reset_cursor();
    }

    fn view_summary(&self) -> Option<String> {
        let table = self.current_table()?;
        let noun = TAB_NOUNS.get(self.tab).copied().unwrap_or("results");
        Some(
            table
                .filtered_summary(noun)
                .unwrap_or_else(|| table.results_summary()),
        )
    }

    fn clear_filters(&mut self) {
        let Some(table) = self.tables.get_mut(self.tab) else {
            return;
        };
        table.clear_filters();
        self.reset_cursor();
        self.set_status_message("Filters cleared");
    }

    fn cycle_filter(&mut self) {
        let Some(table) = self.tables.get_mut(self.tab) else {
            return;
        };
        if table.filter_options().is_empty() {
            self.set_status_message("No category filter on this table");
            return;
        }
        table.cycle_filter();
        let message = format!("Filter: {} ({})", table.active_filter_label(), table.results_summary());
        self.reset_cursor();
        self.set_status_message(message);
    }

    fn clear_filter(&mut self) {
        if let Some(table) = self.tables.get_mut(self.tab) {
            table.select_filter(None);
        }
        self.reset_cursor();
    }

    fn sort_current_column(&mut self) {
        let column = self.cursors.get(self.tab).map(|c| c.column).unwrap_or(0);
        let Some(table) = self.tables.get_mut(self.tab) else {
            return;
        };
        let before = table.config().sort.clone();
        table.click_header(column);
        if table.config().sort == before {
            let label = table.columns().get(column).map(|c| c.label.clone()).unwrap_or_default();
            self.set_status_message(format!("{label} is not sortable"));
        } else {
            let label = table.header_label(column);
            self.set_status_message(format!("Sorted by {label}"));
        }
    }

    fn selected_view_row(&self) -> Option<usize> {
        let cursor = self.cursors.get(self.tab)?;
        let row = cursor.offset + cursor.row;
        let table = self.current_table()?;
        (row < table.len()).then_some(row)
    }

    fn trigger_action(&mut self, action: RowAction) {
        let (Some(row), Some(table)) = (self.selected_view_row(), self.current_table()) else {
            return;
        };
        let mut log = ActionLog::default();
        if table.trigger(action, row, &mut log) {
            let message = log.messages.join("; ");
            info!("{message}");
            self.set_status_message(message);
        } else {
            self.set_status_message(format!("{action:?} is not available here"));
        }
    }

    fn selected_store_id(&self) -> Option<String> {
        if self.tab != STORES_TAB {
            return None;
        }
        let row = self.selected_view_row()?;
        self.current_table()?.record(row)?.id()
    }

    fn begin_rating(&mut self) {
        let Some(store_id) = self.selected_store_id() else {
            self.set_status_message("Select a store to rate");
            return;
        };
        let Some(rater) = self.rater.clone() else {
            self.set_status_message("No user available to rate as");
            return;
        };
        let existing = self.dataset.user_rating(&rater, &store_id);
        let input = self
            .rating_inputs
            .entry(store_id.clone())
            .or_insert_with(|| RatingInput::new(store_id.clone(), existing));
        input.begin_edit();
        debug!("Rating store {store_id}, existing {existing:?}");
        self.active_rating = Some(store_id);
        self.previous_modus = self.modus;
        self.modus = Modus::RATING;
    }

    fn active_input(&mut self) -> Option<&mut RatingInput> {
        let id = self.active_rating.as_ref()?;
        self.rating_inputs.get_mut(id)
    }

    fn select_star(&mut self, star: u8) {
        if let Some(input) = self.active_input() {
            input.select_star(star);
        }
    }

    fn submit_rating(&mut self) {
        let mut submitted: Option<(String, u8)> = None;
        let Some(input) = self.active_input() else {
            return;
        };
        if input
            .submit(|subject, value| submitted = Some((subject.to_string(), value)))
            .is_none()
        {
            self.set_status_message("Choose 1-5 stars before submitting");
            return;
        }
        self.leave_rating();
        if let Some((store_id, value)) = submitted {
            self.record_rating(&store_id, value);
        }
    }

    fn cancel_rating(&mut self) {
        if let Some(input) = self.active_input() {
            input.cancel();
        }
        self.leave_rating();
        self.set_status_message("Rating canceled");
    }

    fn leave_rating(&mut self) {
        self.active_rating = None;
        self.modus = Modus::TABLE;
        self.previous_modus = Modus::RATING;
    }

    /// The console's rating submission workflow: append in memory and refresh the views.
    fn record_rating(&mut self, store_id: &str, value: u8) {
        let Some(rater) = self.rater.clone() else {
            return;
        };
        let now = Local::now().naive_local();
        let result = self
            .dataset
            .add_rating(&rater, store_id, value, now)
            .and_then(|_| self.refresh_rating_tables());
        match result {
            Ok(()) => {
                let summary = self.dataset.store_summary(store_id);
                self.set_status_message(format!(
                    "Rated {value}/5, store average now {} ({} ratings)",
                    summary.display_average(),
                    summary.total
                ));
            }
            Err(e) => {
                error!("Recording rating failed: {e}");
                self.set_status_message(format!("Rating failed: {e}"));
            }
        }
    }

    fn refresh_rating_tables(&mut self) -> Result<(), StoreError> {
        let stores = self.dataset.stores.clone();
        let (_, ratings) = self.dataset.rating_records()?;
        self.tables[STORES_TAB].update_records(stores)?;
        self.tables[RATINGS_TAB].update_records(ratings)?;
        self.clamp_cursor();
        Ok(())
    }

    fn reset_cursor(&mut self) {
        if let Some(cursor) = self.cursors.get_mut(self.tab) {
            cursor.row = 0;
            cursor.offset = 0;
        }
    }

    fn clamp_cursor(&mut self) {
        let height = self.table_height;
        for (cursor, table) in self.cursors.iter_mut().zip(self.tables.iter()) {
            let last = table.len().saturating_sub(1);
            let abs = std::cmp::min(cursor.offset + cursor.row, last);
            if abs < cursor.offset || abs >= cursor.offset + height {
                cursor.offset = abs.saturating_sub(height - 1);
            }
            cursor.row = abs - cursor.offset;
        }
    }

    fn move_selection_beginning(&mut self) {
        self.reset_cursor();
    }

    fn move_selection_end(&mut self) {
        let height = self.table_height;
        let Some(len) = self.current_table().map(|t| t.len()) else {
            return;
        };
        let Some(cursor) = self.cursors.get_mut(self.tab) else {
            return;
        };
        if len < height {
            cursor.offset = 0;
            cursor.row = len.saturating_sub(1);
        } else {
            cursor.offset = len - height;
            cursor.row = height - 1;
        }
    }

    fn move_selection_up(&mut self, size: usize) {
        let Some(cursor) = self.cursors.get_mut(self.tab) else {
            return;
        };
        if cursor.row > 0 {
            // Curser somewhere in the middle
            cursor.row = cursor.row.saturating_sub(size);
        } else {
            // Curser at the top, shift table up
            cursor.offset = cursor.offset.saturating_sub(size);
        }
    }

    fn move_selection_down(&mut self, size: usize) {
        let height = self.table_height;
        let Some(len) = self.current_table().map(|t| t.len()) else {
            return;
        };
        let Some(cursor) = self.cursors.get_mut(self.tab) else {
            return;
        };
        if len == 0 {
            return;
        }
        let target = std::cmp::min(cursor.offset + cursor.row + size, len - 1);
        if target < cursor.offset + height {
            cursor.row = target - cursor.offset;
        } else {
            // At the bottom of the table, need to shift table down
            cursor.offset = target + 1 - height;
            cursor.row = height - 1;
        }
    }

    fn move_column(&mut self, right: bool) {
        let Some(ncols) = self.current_table().map(|t| t.columns().len()) else {
            return;
        };
        let Some(cursor) = self.cursors.get_mut(self.tab) else {
            return;
        };
        if right {
            cursor.column = std::cmp::min(cursor.column + 1, ncols.saturating_sub(1));
        } else {
            cursor.column = cursor.column.saturating_sub(1);
        }
    }

    // -------------------- UI data ---------------------- //

    pub fn get_uidata(&self) -> UIData {
        UIData {
            selected_tab: self.tab,
            table: self.table_data(),
            dashboard: (self.tab == DASHBOARD_TAB).then(|| self.dashboard_data()).flatten(),
            rating: self.rating_panel(),
            popup: (self.modus == Modus::POPUP).then_some(HELP_TEXT),
            cmdinput: self.active_cmdinput.then(|| self.last_input.clone()),
            cmd_prompt: self.cmd_prompt(),
            status_message: self.status_message.clone(),
        }
    }

    fn cmd_prompt(&self) -> String {
        match self.cmd_mode {
            Some(CmdMode::FieldSearch(idx)) => self
                .current_table()
                .and_then(|t| t.field_searches().get(idx))
                .map(|fs| format!("{}: ", fs.label))
                .unwrap_or_default(),
            Some(CmdMode::Search) | None => "/".to_string(),
        }
    }

    fn table_data(&self) -> Option<TableData> {
        let table = self.current_table()?;
        let cursor = self.cursors.get(self.tab).copied().unwrap_or_default();
        let rend = std::cmp::min(cursor.offset + self.table_height, table.len());
        let rows = (cursor.offset..rend).map(|r| table.render_row(r)).collect();
        let headers = (0..table.columns().len())
            .map(|c| table.header_label(c))
            .collect();
        let filter_label = (!table.filter_options().is_empty())
            .then(|| format!("Filter: {}", table.active_filter_label()));
        Some(TableData {
            title: table.title().to_string(),
            headers,
            rows,
            selected_row: cursor.row,
            selected_column: cursor.column,
            abs_selected_row: cursor.offset + cursor.row,
            nrows: table.len(),
            summary: table.results_summary(),
            filter_label,
            search: table.config().search_term.clone(),
            field_terms: table
                .field_searches()
                .iter()
                .filter(|fs| !table.field_term(&fs.field).is_empty())
                .map(|fs| (fs.label.clone(), table.field_term(&fs.field).to_string()))
                .collect(),
            filtered_summary: TAB_NOUNS
                .get(self.tab)
                .and_then(|noun| table.filtered_summary(noun)),
            actions: table.actions_label(),
            no_data: table.state() == ViewState::NoData,
        })
    }

    fn rating_panel(&self) -> Option<RatingPanel> {
        let id = self.active_rating.as_ref()?;
        let input = self.rating_inputs.get(id)?;
        let store_name = self
            .dataset
            .store(id)
            .and_then(|s| s.get_string("name"))
            .unwrap_or_else(|| id.clone());
        Some(RatingPanel {
            store_name,
            prompt: input.prompt_label(),
            shown: input.shown(),
            committed_badge: input.committed_badge(),
            can_submit: input.can_submit(),
        })
    }

    fn dashboard_data(&self) -> Option<DashboardData> {
        let store_id = self.owner_store.as_ref()?;
        let store = self.dataset.store(store_id)?;
        let ratings: Vec<_> = self.dataset.ratings_for(store_id).cloned().collect();
        let shown = recent(&ratings, self.config.recent_reviews);
        let recent_lines = shown
            .iter()
            .map(|r| {
                let author = self
                    .dataset
                    .user(&r.author)
                    .and_then(|u| u.get_string("name"))
                    .unwrap_or_else(|| r.author.clone());
                ReviewLine {
                    initials: initials(&author),
                    author,
                    date: r.timestamp.format("%Y-%m-%d").to_string(),
                    value: r.value,
                    comment: r.comment.clone(),
                }
            })
            .collect::<Vec<_>>();
        Some(DashboardData {
            store_name: store.get_string("name").unwrap_or_else(|| store_id.clone()),
            summary: self.dataset.store_summary(store_id),
            recent_note: recent_summary(recent_lines.len(), ratings.len()),
            recent: recent_lines,
            stats: self.dataset.stats(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn model() -> Model {
        let dataset = Dataset::demo().unwrap();
        Model::init(&AppConfig::default(), dataset, 120, 30).unwrap()
    }

    fn send(model: &mut Model, msg: Message) {
        model.update(Some(msg)).unwrap();
    }

    fn key(c: char) -> Message {
        Message::RawKey(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn search_as_you_type_and_cancel_restores() {
        let mut m = model();
        send(&mut m, Message::Search);
        assert!(m.raw_keyevents());
        for c in "sarah".chars() {
            send(&mut m, key(c));
        }
        assert_eq!(m.get_uidata().table.unwrap().nrows, 1);

        send(&mut m, Message::RawKey(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(!m.raw_keyevents());
        assert_eq!(m.get_uidata().table.unwrap().nrows, 5);
    }

    fn type_in(model: &mut Model, text: &str) {
        for c in text.chars() {
            send(model, key(c));
        }
        send(model, Message::RawKey(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
    }

    fn store_names(model: &Model) -> Vec<String> {
        model.tables[STORES_TAB]
            .view()
            .filter_map(|s| s.get_string("name"))
            .collect()
    }

    #[test]
    fn store_browse_by_name_and_address() {
        let mut m = model();
        send(&mut m, Message::NextTab);

        send(&mut m, Message::FieldSearch(0));
        assert_eq!(m.get_uidata().cmd_prompt, "Store name: ");
        type_in(&mut m, "market");
        assert_eq!(store_names(&m), vec!["Fresh Market Groceries"]);
        assert_eq!(m.get_uidata().status_message, "Showing 1 of 6 stores");

        // Address terms alone ignore store names
        send(&mut m, Message::ClearFilters);
        send(&mut m, Message::FieldSearch(1));
        type_in(&mut m, "district");
        assert_eq!(store_names(&m).len(), 3);

        send(&mut m, Message::FieldSearch(0));
        type_in(&mut m, "coffee");
        assert_eq!(store_names(&m), vec!["Downtown Coffee Shop"]);
        let data = m.get_uidata().table.unwrap();
        assert_eq!(
            data.field_terms,
            vec![
                ("Store name".to_string(), "coffee".to_string()),
                ("Address".to_string(), "district".to_string())
            ]
        );
        assert_eq!(data.filtered_summary.as_deref(), Some("Showing 1 of 6 stores"));

        send(&mut m, Message::ClearFilters);
        assert_eq!(store_names(&m).len(), 6);
        assert!(m.get_uidata().table.unwrap().filtered_summary.is_none());
    }

    #[test]
    fn field_search_only_where_designated() {
        let mut m = model();
        send(&mut m, Message::FieldSearch(0));
        assert!(!m.raw_keyevents());
        assert_eq!(m.get_uidata().status_message, "No field search on this table");
    }

    #[test]
    fn filter_and_sort_on_users() {
        let mut m = model();
        send(&mut m, Message::CycleFilter);
        let data = m.get_uidata().table.unwrap();
        assert_eq!(data.nrows, 1);
        assert_eq!(data.filter_label.as_deref(), Some("Filter: System Admin"));

        send(&mut m, Message::ClearFilter);
        send(&mut m, Message::Sort);
        let data = m.get_uidata().table.unwrap();
        assert_eq!(data.headers[0], "Name ▲");
        assert_eq!(data.rows[0][0].text(), "David Alexander Wilson Taylor");

        // address column is not sortable
        send(&mut m, Message::MoveRight);
        send(&mut m, Message::MoveRight);
        send(&mut m, Message::Sort);
        assert_eq!(m.get_uidata().table.unwrap().headers[0], "Name ▲");
    }

    #[test]
    fn rating_a_store_updates_aggregates() {
        let mut m = model();
        send(&mut m, Message::NextTab);
        // Fresh Market Groceries, not yet rated by the rater
        send(&mut m, Message::MoveDown);
        send(&mut m, Message::MoveDown);
        send(&mut m, Message::Rate);
        assert!(m.is_rating());
        let panel = m.get_uidata().rating.unwrap();
        assert_eq!(panel.prompt, "Rate Store");
        assert!(!panel.can_submit);

        send(&mut m, Message::Enter);
        assert!(m.is_rating());

        send(&mut m, Message::Star(4));
        send(&mut m, Message::Enter);
        assert!(!m.is_rating());
        assert_eq!(m.dataset.user_rating("2", "3"), Some(4));
        assert_eq!(m.dataset.store_summary("3").total, 3);
        assert_eq!(m.tables[RATINGS_TAB].records().len(), 13);
    }

    #[test]
    fn cancel_rating_emits_nothing() {
        let mut m = model();
        send(&mut m, Message::NextTab);
        send(&mut m, Message::Rate);
        send(&mut m, Message::Star(1));
        send(&mut m, Message::Exit);
        assert!(!m.is_rating());
        assert_eq!(m.dataset.ratings.len(), 12);
        assert_eq!(m.rating_inputs["1"].committed(), 5);
    }

    #[test]
    fn rating_only_from_stores_tab() {
        let mut m = model();
        send(&mut m, Message::Rate);
        assert!(!m.is_rating());
    }

    #[test]
    fn actions_report_to_status_line() {
        let mut m = model();
        send(&mut m, Message::Delete);
        assert_eq!(m.get_uidata().status_message, "Delete requested for John Smith Anderson Williams");
        send(&mut m, Message::NextTab);
        send(&mut m, Message::NextTab);
        send(&mut m, Message::Edit);
        assert_eq!(m.get_uidata().status_message, "Edit is not available here");
    }

    #[test]
    fn dashboard_shows_owner_store() {
        let mut m = model();
        send(&mut m, Message::PreviousTab);
        let dashboard = m.get_uidata().dashboard.unwrap();
        assert_eq!(dashboard.store_name, "Downtown Coffee Shop");
        assert_eq!(dashboard.summary.total, 5);
        assert_eq!(dashboard.recent.len(), 3);
        assert_eq!(dashboard.recent[0].initials, "SM");
        assert_eq!(dashboard.recent_note.as_deref(), Some("Showing 3 of 5 reviews"));
    }

    #[test]
    fn cursor_stays_in_view() {
        let mut m = Model::init(&AppConfig::default(), Dataset::demo().unwrap(), 80, 10).unwrap();
        let height = m.table_height;
        send(&mut m, Message::MoveEnd);
        let data = m.get_uidata().table.unwrap();
        assert_eq!(data.abs_selected_row, 4);
        assert!(data.selected_row < height);
        send(&mut m, Message::MovePageUp);
        send(&mut m, Message::MoveBeginning);
        assert_eq!(m.get_uidata().table.unwrap().abs_selected_row, 0);
    }
}
