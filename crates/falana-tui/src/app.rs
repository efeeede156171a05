use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::sync::Arc;
use tracing::{debug, info};

use falana_core::{Backend, InFlightSend, Message, SendOutcome, SessionState, SessionStore, ThreadId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Threads,
    Transcript,
    Input,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    pub base_url: String,

    // Session (current thread, transcript, busy flag)
    pub session: SessionStore,
    pub send_task: Option<InFlightSend>,

    // Sidebar: backend threads plus a trailing "New Conversation" entry
    pub threads: Vec<ThreadId>,
    pub thread_state: ListState,

    // Message input
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars

    // Transcript view
    pub transcript_scroll: u16,
    pub transcript_height: u16, // Height of transcript area for scroll calculations
    pub transcript_width: u16,  // Width of transcript area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub threads_area: Option<Rect>,
    pub transcript_area: Option<Rect>,
}

impl App {
    pub async fn new(backend: Arc<dyn Backend>, base_url: &str) -> Self {
        let mut thread_state = ListState::default();
        thread_state.select(Some(0));

        let mut app = Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: FocusPane::Threads,
            base_url: base_url.to_string(),

            session: SessionStore::new(backend),
            send_task: None,

            threads: Vec::new(),
            thread_state,

            input: String::new(),
            input_cursor: 0,

            transcript_scroll: 0,
            transcript_height: 0,
            transcript_width: 0,

            animation_frame: 0,

            threads_area: None,
            transcript_area: None,
        };
        app.refresh_threads().await;
        app
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn is_busy(&self) -> bool {
        self.state().is_busy()
    }

    pub fn is_active(&self, thread: &ThreadId) -> bool {
        self.state().current_thread() == Some(thread)
    }

    /// Index of the "New Conversation" entry in the sidebar
    pub fn new_thread_index(&self) -> usize {
        self.threads.len()
    }

    pub async fn refresh_threads(&mut self) {
        self.threads = self.session.list_threads().await;
        let last = self.new_thread_index();
        let selected = self.thread_state.selected().unwrap_or(0).min(last);
        self.thread_state.select(Some(selected));
    }

    // Sidebar navigation
    pub fn thread_nav_down(&mut self) {
        let last = self.new_thread_index();
        let i = self.thread_state.selected().map_or(0, |i| (i + 1).min(last));
        self.thread_state.select(Some(i));
    }

    pub fn thread_nav_up(&mut self) {
        let i = self.thread_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.thread_state.select(Some(i));
    }

    /// Open the highlighted sidebar entry: a thread, or a new conversation
    pub async fn activate_selected(&mut self) {
        let selected = self.thread_state.selected().unwrap_or(0);
        match self.threads.get(selected).cloned() {
            Some(thread) => self.select_thread(thread).await,
            None => self.create_thread().await,
        }
    }

    pub async fn select_thread(&mut self, thread: ThreadId) {
        self.session.select_thread(thread).await;
        self.transcript_scroll = 0;
        self.scroll_transcript_to_bottom();
    }

    pub async fn create_thread(&mut self) {
        self.session.create_thread();
        self.transcript_scroll = 0;
        self.focus = FocusPane::Input;
        self.input_mode = InputMode::Editing;
        self.refresh_threads().await;
    }

    /// Submit the input box. Dropped without feedback while a send is in flight.
    pub fn submit_input(&mut self) {
        let text = std::mem::take(&mut self.input);
        self.input_cursor = 0;
        if text.trim().is_empty() {
            return;
        }

        match self.session.dispatch_send(&text) {
            Some(task) => {
                debug!(thread = %task.pending().thread_id, "send dispatched");
                self.send_task = Some(task);
                self.scroll_transcript_to_bottom();
            }
            None => debug!(busy = self.is_busy(), "send dropped"),
        }
    }

    /// Apply the send result once its task has finished. Never blocks on a
    /// running task.
    pub async fn poll_send(&mut self) {
        if !self.send_task.as_ref().is_some_and(InFlightSend::is_finished) {
            return;
        }
        if let Some(task) = self.send_task.take() {
            self.complete_send(task).await;
        }
    }

    async fn complete_send(&mut self, task: InFlightSend) {
        let (pending, result) = task.join().await;
        let outcome = self.session.finish_send(pending, result);
        info!(?outcome, "send completed");
        if outcome == SendOutcome::Delivered {
            self.scroll_transcript_to_bottom();
        }
        // A first message makes a new thread show up on the backend
        self.refresh_threads().await;
    }

    /// Messages the transcript pane shows
    pub fn visible_messages(&self) -> impl Iterator<Item = &Message> {
        self.state().messages().iter().filter(|m| m.is_displayable())
    }

    /// Whether the send in flight belongs to the thread on screen
    pub fn is_thinking(&self) -> bool {
        self.send_task
            .as_ref()
            .is_some_and(|task| self.is_active(&task.pending().thread_id))
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_down(&mut self) {
        self.transcript_scroll = self.transcript_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half = (self.transcript_height / 2).max(1);
        self.transcript_scroll = self.transcript_scroll.saturating_add(half);
    }

    pub fn scroll_half_page_up(&mut self) {
        let half = (self.transcript_height / 2).max(1);
        self.transcript_scroll = self.transcript_scroll.saturating_sub(half);
    }

    /// Scroll the transcript so the newest message (or "thinking") is visible
    pub fn scroll_transcript_to_bottom(&mut self) {
        // Use actual transcript width for wrap calculation, default to 50 if not set
        let wrap_width = if self.transcript_width > 0 {
            self.transcript_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.visible_messages() {
            total_lines = total_lines.saturating_add(1); // Role line
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                let wrapped = (char_count / wrap_width + 1) as u16;
                total_lines = total_lines.saturating_add(wrapped);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        if self.is_thinking() {
            total_lines = total_lines.saturating_add(2);
        }

        let visible_height = if self.transcript_height > 0 {
            self.transcript_height
        } else {
            20
        };

        self.transcript_scroll = total_lines.saturating_sub(visible_height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use falana_core::{BackendError, Notice};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    /// Backend whose sends wait until the test hands out a permit
    struct GatedBackend {
        threads: Vec<ThreadId>,
        gate: Semaphore,
        sends: AtomicUsize,
        fail: bool,
    }

    impl GatedBackend {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                threads: vec![ThreadId::from("thread-aaaa1111")],
                gate: Semaphore::new(0),
                sends: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl Backend for GatedBackend {
        async fn list_threads(&self) -> Result<Vec<ThreadId>, BackendError> {
            Ok(self.threads.clone())
        }

        async fn fetch_history(&self, _thread: &ThreadId) -> Result<Vec<Message>, BackendError> {
            Ok(vec![Message::human("hi")])
        }

        async fn send_message(&self, thread: &ThreadId, text: &str) -> Result<Vec<Message>, BackendError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            let _permit = self.gate.acquire().await.map_err(|_| BackendError::Aborted)?;
            if self.fail {
                return Err(BackendError::Timeout {
                    url: format!("/chat/{}", thread),
                });
            }
            Ok(vec![Message::human(text), Message::ai("hi there")])
        }
    }

    async fn settle(app: &mut App) {
        for _ in 0..100 {
            if app.send_task.is_none() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            app.poll_send().await;
        }
        panic!("send never completed");
    }

    fn type_text(app: &mut App, text: &str) {
        app.input = text.to_string();
        app.input_cursor = text.chars().count();
    }

    #[tokio::test]
    async fn test_startup_lists_threads() {
        let app = App::new(GatedBackend::new(false), "http://test").await;
        assert_eq!(app.threads, vec![ThreadId::from("thread-aaaa1111")]);
        assert_eq!(app.new_thread_index(), 1);
        assert!(app.state().current_thread().is_none());
    }

    #[tokio::test]
    async fn test_activate_selected_opens_thread() {
        let mut app = App::new(GatedBackend::new(false), "http://test").await;

        app.activate_selected().await;

        assert!(app.is_active(&ThreadId::from("thread-aaaa1111")));
        assert_eq!(app.visible_messages().count(), 1);
    }

    #[tokio::test]
    async fn test_activate_new_entry_creates_thread() {
        let mut app = App::new(GatedBackend::new(false), "http://test").await;
        app.thread_nav_down();
        app.thread_nav_down();
        assert_eq!(app.thread_state.selected(), Some(1));

        app.activate_selected().await;

        let current = app.state().current_thread().cloned().unwrap();
        assert!(current.is_client_generated());
        assert_eq!(app.input_mode, InputMode::Editing);
        assert_eq!(app.visible_messages().count(), 0);
    }

    #[tokio::test]
    async fn test_second_submit_while_busy_is_dropped() {
        let backend = GatedBackend::new(false);
        let mut app = App::new(backend.clone(), "http://test").await;
        app.create_thread().await;

        type_text(&mut app, "hello");
        app.submit_input();
        assert!(app.is_busy());
        assert!(app.input.is_empty());

        type_text(&mut app, "are you there?");
        app.submit_input();
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(backend.sends.load(Ordering::SeqCst), 1);
        assert_eq!(app.state().messages(), &[Message::human("hello")]);

        backend.gate.add_permits(1);
        settle(&mut app).await;

        assert!(!app.is_busy());
        assert_eq!(
            app.state().messages(),
            &[Message::human("hello"), Message::ai("hi there")]
        );
        assert_eq!(backend.sends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_send_shows_notice() {
        let backend = GatedBackend::new(true);
        let mut app = App::new(backend.clone(), "http://test").await;
        app.create_thread().await;

        type_text(&mut app, "hello");
        app.submit_input();
        backend.gate.add_permits(1);
        settle(&mut app).await;

        assert_eq!(app.state().messages(), &[Message::human("hello")]);
        assert_eq!(app.state().notice(), Some(Notice::BackendUnavailable));
        assert!(!app.is_busy());
    }

    #[tokio::test]
    async fn test_switching_threads_mid_send() {
        let backend = GatedBackend::new(false);
        let mut app = App::new(backend.clone(), "http://test").await;
        app.create_thread().await;
        type_text(&mut app, "hello");
        app.submit_input();
        assert!(app.is_thinking());

        app.select_thread(ThreadId::from("thread-aaaa1111")).await;
        assert!(!app.is_thinking());
        assert!(app.is_busy());

        backend.gate.add_permits(1);
        settle(&mut app).await;

        assert!(!app.is_busy());
        assert_eq!(app.state().messages(), &[Message::human("hi")]);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let backend = GatedBackend::new(false);
        let mut app = App::new(backend.clone(), "http://test").await;
        app.create_thread().await;

        type_text(&mut app, "   ");
        app.submit_input();

        assert!(app.send_task.is_none());
        assert!(!app.is_busy());
        assert_eq!(backend.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_thread_nav_clamps() {
        let mut app = App::new(GatedBackend::new(false), "http://test").await;
        app.thread_nav_up();
        assert_eq!(app.thread_state.selected(), Some(0));
        for _ in 0..5 {
            app.thread_nav_down();
        }
        assert_eq!(app.thread_state.selected(), Some(app.new_thread_index()));
    }
}
