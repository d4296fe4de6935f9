use ritornello::player::{PlayerAdapter, PlayerError};

/// Test adapter whose position is scripted by the caller and whose commands
/// are recorded for assertions.
pub struct ScriptedPlayer {
    pub ready: bool,
    pub duration: f32,
    pub position: f32,
    pub seeks: Vec<f32>,
    pub play_calls: usize,
    pub pause_calls: usize,
    playing: bool,
}

impl ScriptedPlayer {
    pub fn ready_with_duration(duration: f32) -> Self {
        Self {
            ready: true,
            duration,
            position: 0.0,
            seeks: Vec::new(),
            play_calls: 0,
            pause_calls: 0,
            playing: false,
        }
    }

    pub fn not_ready() -> Self {
        let mut player = Self::ready_with_duration(0.0);
        player.ready = false;
        player
    }
}

impl PlayerAdapter for ScriptedPlayer {
    fn pump(&mut self) -> Option<PlayerError> {
        None
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn duration(&self) -> Option<f32> {
        self.ready.then_some(self.duration)
    }

    fn current_time(&self) -> f32 {
        self.position
    }

    fn seek_to(&mut self, seconds: f32) {
        let target = seconds.clamp(0.0, self.duration);
        self.seeks.push(target);
        self.position = target;
    }

    fn play(&mut self) {
        self.play_calls += 1;
        self.playing = true;
    }

    fn pause(&mut self) {
        self.pause_calls += 1;
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}
