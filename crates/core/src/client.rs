//! Application callbacks for client-driven methods.

use crate::methods::Verb;

type Callback = Box<dyn Fn() + Send + Sync>;

/// Callback slots the embedding application fills in for the methods it
/// wants to react to.
///
/// A filled slot does two things: it advertises the method in the OPTIONS
/// capability list, and it gets invoked when a client issues the method.
/// PAUSE and TEARDOWN additionally carry built-in session bookkeeping, so
/// their slots are purely notifications; the remaining verbs are rejected
/// with `405 Method Not Allowed` when their slot is empty.
///
/// ```no_run
/// use rtsp_control::ClientHandler;
///
/// let handler = ClientHandler::new()
///     .on_play(|| println!("client started playback"))
///     .on_teardown(|| println!("client went away"));
/// ```
#[derive(Default)]
pub struct ClientHandler {
    play: Option<Callback>,
    pause: Option<Callback>,
    teardown: Option<Callback>,
    record: Option<Callback>,
    announce: Option<Callback>,
    get_parameter: Option<Callback>,
    set_parameter: Option<Callback>,
}

impl ClientHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_play(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.play = Some(Box::new(callback));
        self
    }

    pub fn on_pause(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.pause = Some(Box::new(callback));
        self
    }

    pub fn on_teardown(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.teardown = Some(Box::new(callback));
        self
    }

    pub fn on_record(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.record = Some(Box::new(callback));
        self
    }

    pub fn on_announce(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.announce = Some(Box::new(callback));
        self
    }

    pub fn on_get_parameter(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.get_parameter = Some(Box::new(callback));
        self
    }

    pub fn on_set_parameter(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.set_parameter = Some(Box::new(callback));
        self
    }

    fn slot(&self, verb: Verb) -> Option<&Callback> {
        match verb {
            Verb::Play => self.play.as_ref(),
            Verb::Pause => self.pause.as_ref(),
            Verb::Teardown => self.teardown.as_ref(),
            Verb::Record => self.record.as_ref(),
            Verb::Announce => self.announce.as_ref(),
            Verb::GetParameter => self.get_parameter.as_ref(),
            Verb::SetParameter => self.set_parameter.as_ref(),
            _ => None,
        }
    }

    /// Whether the application registered a callback for `verb`.
    pub fn supports(&self, verb: Verb) -> bool {
        self.slot(verb).is_some()
    }

    /// Invokes the callback for `verb`, if registered.
    pub fn notify(&self, verb: Verb) {
        if let Some(callback) = self.slot(verb) {
            callback();
        }
    }
}
