use std::sync::mpsc::{channel, Receiver, Sender};

use eframe::egui;
use futures_util::StreamExt;

use crate::api::client::{ApiClient, ChatCredentials};
use crate::api::models::{FinalPayload, ThinkingPayload};
use crate::api::sse::SseDecoder;
use crate::state::prefs::Prefs;
use crate::state::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatTab {
    Chat,
    Brief,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    fn parse(raw: &str) -> Self {
        match raw {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => Role::System,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub thinking: String,
    pub tool_trace: Vec<serde_json::Value>,
    /// True for the assistant placeholder while its answer streams in.
    pub pending: bool,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            thinking: String::new(),
            tool_trace: Vec::new(),
            pending: false,
        }
    }
}

/// Events delivered from background tasks to the UI thread.
enum ChatEvent {
    History(Vec<ChatMessage>),
    HistoryCleared,
    Thinking(String),
    Final {
        answer: String,
        tool_trace: Vec<serde_json::Value>,
    },
    StreamError(String),
    StreamClosed,
    Brief(Result<String, String>),
}

/// The assistant window: a streamed chat tab and a one-shot brief tab,
/// loosely coupled to the rest of the dashboard.
pub struct ChatPanel {
    pub open: bool,
    tab: ChatTab,
    messages: Vec<ChatMessage>,
    input: String,
    streaming: bool,
    show_settings: bool,
    temp_key: String,
    temp_provider: String,
    brief_markdown: String,
    brief_loading: bool,
    tx: Sender<ChatEvent>,
    rx: Receiver<ChatEvent>,
}

impl ChatPanel {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            open: false,
            tab: ChatTab::Chat,
            messages: Vec::new(),
            input: String::new(),
            streaming: false,
            show_settings: false,
            temp_key: String::new(),
            temp_provider: String::new(),
            brief_markdown: String::new(),
            brief_loading: false,
            tx,
            rx,
        }
    }

    /// Kick off the history load for this session.
    pub fn load_history(
        &self,
        rt: &tokio::runtime::Handle,
        client: &ApiClient,
        session_id: &str,
        ctx: &egui::Context,
    ) {
        let client = client.clone();
        let session_id = session_id.to_string();
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        rt.spawn(async move {
            match client.chat_history(&session_id).await {
                Ok(history) => {
                    let messages = history
                        .messages
                        .into_iter()
                        .map(|m| ChatMessage::new(Role::parse(&m.role), m.content))
                        .collect();
                    let _ = tx.send(ChatEvent::History(messages));
                }
                Err(e) => tracing::warn!("chat history load failed: {e}"),
            }
            ctx.request_repaint();
        });
    }

    /// Drain background events into panel state. Called once per frame.
    pub fn poll(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                ChatEvent::History(messages) => {
                    // Only adopt stored history when nothing happened locally.
                    if self.messages.is_empty() {
                        self.messages = messages;
                    }
                }
                ChatEvent::HistoryCleared => {
                    self.messages.clear();
                }
                ChatEvent::Thinking(text) => {
                    if let Some(last) = self.messages.last_mut() {
                        if last.pending {
                            last.thinking.push_str(&text);
                        }
                    }
                }
                ChatEvent::Final { answer, tool_trace } => {
                    if let Some(last) = self.messages.last_mut() {
                        if last.pending {
                            last.content = answer;
                            last.tool_trace = tool_trace;
                            last.pending = false;
                        }
                    }
                    self.streaming = false;
                }
                ChatEvent::StreamError(msg) => {
                    match self.messages.last_mut() {
                        Some(last) if last.pending => {
                            last.content = msg;
                            last.pending = false;
                        }
                        _ => self.messages.push(ChatMessage::new(Role::Assistant, msg)),
                    }
                    self.streaming = false;
                }
                ChatEvent::StreamClosed => {
                    if let Some(last) = self.messages.last_mut() {
                        if last.pending {
                            last.pending = false;
                            if last.content.is_empty() {
                                last.content = "(stream ended without an answer)".to_string();
                            }
                        }
                    }
                    self.streaming = false;
                }
                ChatEvent::Brief(result) => {
                    self.brief_loading = false;
                    match result {
                        Ok(markdown) => self.brief_markdown = markdown,
                        Err(msg) => self.brief_markdown = msg,
                    }
                }
            }
        }
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        rt: &tokio::runtime::Handle,
        client: &ApiClient,
        prefs: &mut Prefs,
        theme: &Theme,
    ) {
        if !self.open {
            return;
        }

        let mut open = self.open;
        egui::Window::new("Assistant")
            .open(&mut open)
            .default_size([420.0, 520.0])
            .resizable(true)
            .show(ctx, |ui| {
                self.show_contents(ui, ctx, rt, client, prefs, theme);
            });
        self.open = open;
    }

    fn show_contents(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        rt: &tokio::runtime::Handle,
        client: &ApiClient,
        prefs: &mut Prefs,
        theme: &Theme,
    ) {
        ui.horizontal(|ui| {
            if ui
                .selectable_label(self.tab == ChatTab::Chat, "Chat")
                .clicked()
            {
                self.tab = ChatTab::Chat;
            }
            if ui
                .selectable_label(self.tab == ChatTab::Brief, "Brief")
                .clicked()
            {
                self.tab = ChatTab::Brief;
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("Settings").clicked() {
                    self.temp_key = prefs.api_key.clone();
                    self.temp_provider = prefs.provider.clone();
                    self.show_settings = !self.show_settings;
                }
                if self.tab == ChatTab::Chat && ui.small_button("Clear").clicked() {
                    self.clear_history(rt, client, &prefs.session_id, ctx);
                }
            });
        });

        if self.show_settings {
            self.show_settings_strip(ui, prefs);
        }
        ui.separator();

        match self.tab {
            ChatTab::Chat => self.show_chat_tab(ui, ctx, rt, client, prefs, theme),
            ChatTab::Brief => self.show_brief_tab(ui, ctx, rt, client, prefs),
        }
    }

    fn show_settings_strip(&mut self, ui: &mut egui::Ui, prefs: &mut Prefs) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.label(egui::RichText::new("LLM credential (kept local, sent per request)").weak());
            ui.horizontal(|ui| {
                ui.label("API key:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.temp_key)
                        .password(true)
                        .desired_width(220.0),
                );
            });
            ui.horizontal(|ui| {
                ui.label("Provider:");
                ui.text_edit_singleline(&mut self.temp_provider);
            });
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    prefs.api_key = self.temp_key.clone();
                    prefs.provider = self.temp_provider.trim().to_string();
                    if prefs.provider.is_empty() {
                        prefs.provider = "openrouter".to_string();
                    }
                    self.show_settings = false;
                }
                if ui.button("Cancel").clicked() {
                    self.show_settings = false;
                }
            });
        });
    }

    fn show_chat_tab(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        rt: &tokio::runtime::Handle,
        client: &ApiClient,
        prefs: &Prefs,
        theme: &Theme,
    ) {
        let input_height = 64.0;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .max_height(ui.available_height() - input_height)
            .show(ui, |ui| {
                if self.messages.is_empty() {
                    ui.label(
                        egui::RichText::new("Ask about current liquidity conditions.").weak(),
                    );
                }
                for msg in &self.messages {
                    show_message(ui, msg, theme);
                }
            });

        ui.separator();
        let send = ui
            .horizontal(|ui| {
                let edit = egui::TextEdit::multiline(&mut self.input)
                    .desired_rows(2)
                    .hint_text("Ask a question...")
                    .desired_width(ui.available_width() - 70.0);
                let edit_resp = ui.add(edit);
                let enter = edit_resp.has_focus()
                    && ui.input(|i| i.key_pressed(egui::Key::Enter) && !i.modifiers.shift);
                let clicked = ui
                    .add_enabled(!self.streaming, egui::Button::new("Send"))
                    .clicked();
                clicked || (enter && !self.streaming)
            })
            .inner;

        if send {
            self.send_question(ctx, rt, client, prefs);
        }
        if self.streaming {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(egui::RichText::new("Thinking...").weak());
            });
        }
    }

    fn show_brief_tab(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        rt: &tokio::runtime::Handle,
        client: &ApiClient,
        prefs: &Prefs,
    ) {
        ui.horizontal(|ui| {
            let can_generate = !self.brief_loading && !prefs.api_key.is_empty();
            if ui
                .add_enabled(can_generate, egui::Button::new("Generate Brief"))
                .clicked()
            {
                self.generate_brief(ctx, rt, client, prefs);
            }
            if self.brief_loading {
                ui.spinner();
            }
            if prefs.api_key.is_empty() {
                ui.label(egui::RichText::new("Set an API key in Settings first").weak());
            }
        });
        ui.separator();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if self.brief_markdown.is_empty() {
                    ui.label(egui::RichText::new("No brief generated yet.").weak());
                } else {
                    ui.label(&self.brief_markdown);
                }
            });
    }

    fn send_question(
        &mut self,
        ctx: &egui::Context,
        rt: &tokio::runtime::Handle,
        client: &ApiClient,
        prefs: &Prefs,
    ) {
        let question = self.input.trim().to_string();
        if question.is_empty() || self.streaming {
            return;
        }
        if prefs.api_key.is_empty() {
            self.temp_key = prefs.api_key.clone();
            self.temp_provider = prefs.provider.clone();
            self.show_settings = true;
            return;
        }
        self.input.clear();
        self.messages.push(ChatMessage::new(Role::User, &question));
        let mut placeholder = ChatMessage::new(Role::Assistant, "");
        placeholder.pending = true;
        self.messages.push(placeholder);
        self.streaming = true;

        let client = client.clone();
        let session_id = prefs.session_id.clone();
        let creds = ChatCredentials {
            api_key: prefs.api_key.clone(),
            provider: prefs.provider.clone(),
        };
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        rt.spawn(async move {
            stream_answer(&client, &question, &session_id, &creds, &tx, &ctx).await;
            ctx.request_repaint();
        });
    }

    fn generate_brief(
        &mut self,
        ctx: &egui::Context,
        rt: &tokio::runtime::Handle,
        client: &ApiClient,
        prefs: &Prefs,
    ) {
        self.brief_loading = true;
        let client = client.clone();
        let creds = ChatCredentials {
            api_key: prefs.api_key.clone(),
            provider: prefs.provider.clone(),
        };
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        rt.spawn(async move {
            let result = match client.brief(&creds).await {
                Ok(resp) => Ok(resp.markdown),
                Err(e) => {
                    tracing::warn!("brief generation failed: {e}");
                    Err(format!("Brief generation failed: {e}"))
                }
            };
            let _ = tx.send(ChatEvent::Brief(result));
            ctx.request_repaint();
        });
    }

    fn clear_history(
        &self,
        rt: &tokio::runtime::Handle,
        client: &ApiClient,
        session_id: &str,
        ctx: &egui::Context,
    ) {
        let client = client.clone();
        let session_id = session_id.to_string();
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        rt.spawn(async move {
            match client.clear_chat_history(&session_id).await {
                Ok(()) => {
                    let _ = tx.send(ChatEvent::HistoryCleared);
                }
                Err(e) => tracing::warn!("history clear failed: {e}"),
            }
            ctx.request_repaint();
        });
    }
}

impl Default for ChatPanel {
    fn default() -> Self {
        Self::new()
    }
}

/// Consume the SSE answer stream, forwarding decoded events to the UI.
/// Every failure path degrades to an inline assistant message.
async fn stream_answer(
    client: &ApiClient,
    question: &str,
    session_id: &str,
    creds: &ChatCredentials,
    tx: &Sender<ChatEvent>,
    ctx: &egui::Context,
) {
    let resp = match client.ask_stream(question, session_id, creds).await {
        Ok(resp) => resp,
        Err(e) => {
            let _ = tx.send(ChatEvent::StreamError(format!(
                "Failed to reach the assistant: {e}"
            )));
            return;
        }
    };

    let mut decoder = SseDecoder::new();
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tx.send(ChatEvent::StreamError(format!("Stream interrupted: {e}")));
                return;
            }
        };
        for frame in decoder.push(&bytes) {
            match frame.event.as_str() {
                "thinking_token" => {
                    if let Ok(payload) = serde_json::from_str::<ThinkingPayload>(&frame.data) {
                        let _ = tx.send(ChatEvent::Thinking(payload.text));
                        ctx.request_repaint();
                    }
                }
                "final" => {
                    match serde_json::from_str::<FinalPayload>(&frame.data) {
                        Ok(payload) => {
                            let _ = tx.send(ChatEvent::Final {
                                answer: payload.answer,
                                tool_trace: payload.tool_trace,
                            });
                        }
                        Err(e) => {
                            let _ = tx.send(ChatEvent::StreamError(format!(
                                "Malformed answer payload: {e}"
                            )));
                        }
                    }
                    ctx.request_repaint();
                }
                "error" => {
                    let _ = tx.send(ChatEvent::StreamError(format!(
                        "Assistant error: {}",
                        frame.data
                    )));
                    ctx.request_repaint();
                }
                // answer_token frames exist on the wire but the final event
                // carries the full text, so they are ignored here.
                _ => {}
            }
        }
    }
    let _ = tx.send(ChatEvent::StreamClosed);
}

fn show_message(ui: &mut egui::Ui, msg: &ChatMessage, theme: &Theme) {
    let (label, color) = match msg.role {
        Role::User => ("You", theme.primary_axis_color()),
        Role::Assistant => ("Assistant", theme.secondary_axis_color()),
        Role::System => ("System", ui.visuals().weak_text_color()),
    };
    ui.add_space(4.0);
    ui.colored_label(color, egui::RichText::new(label).small().strong());

    if !msg.thinking.is_empty() {
        egui::CollapsingHeader::new(egui::RichText::new("thinking").weak().small())
            .id_salt(ui.next_auto_id())
            .show(ui, |ui| {
                ui.label(egui::RichText::new(&msg.thinking).weak().small());
            });
    }
    if msg.pending && msg.content.is_empty() {
        ui.label(egui::RichText::new("...").weak());
    } else {
        ui.label(&msg.content);
    }
    if !msg.tool_trace.is_empty() {
        egui::CollapsingHeader::new(
            egui::RichText::new(format!("tool trace ({})", msg.tool_trace.len()))
                .weak()
                .small(),
        )
        .id_salt(ui.next_auto_id())
        .show(ui, |ui| {
            for step in &msg.tool_trace {
                let tool = step
                    .get("tool")
                    .and_then(|t| t.as_str())
                    .unwrap_or("unknown tool");
                ui.monospace(tool);
            }
        });
    }
}
