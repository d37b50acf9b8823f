use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU32, Ordering},
};

use instant::Duration;
use pause_blur::{
    BlurScreen, Out, Screen,
    context::Context,
    screen::Frame,
};

/// What the wrapped screen went through, readable after the loop ended.
#[derive(Clone, Default)]
pub(crate) struct SessionLog {
    frames: Arc<AtomicU32>,
    blurred_frames: Arc<AtomicU32>,
    paused_without_targets: Arc<AtomicBool>,
    zero_resize_survived: Arc<AtomicBool>,
    frames_after_dispose: Arc<AtomicU32>,
    disposed: Arc<AtomicBool>,
}

impl SessionLog {
    pub fn frames(&self) -> u32 {
        self.frames.load(Ordering::SeqCst)
    }

    pub fn blurred_frames(&self) -> u32 {
        self.blurred_frames.load(Ordering::SeqCst)
    }

    pub fn paused_without_targets(&self) -> bool {
        self.paused_without_targets.load(Ordering::SeqCst)
    }

    pub fn zero_resize_survived(&self) -> bool {
        self.zero_resize_survived.load(Ordering::SeqCst)
    }

    pub fn frames_after_dispose(&self) -> u32 {
        self.frames_after_dispose.load(Ordering::SeqCst)
    }

    pub fn disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

/// Drives a [`BlurScreen`] through a scripted session:
///
/// - frame 0 pauses before the screen saw any size, then hands it the size
/// - frame 1 resizes to zero and back
/// - the last two frames render after a double dispose
/// - frame `limit - 1` asks the loop to exit
pub(crate) struct ScriptedScreen {
    inner: BlurScreen,
    log: SessionLog,
    limit: u32,
    size: (u32, u32),
    hold_resizes: bool,
}

impl ScriptedScreen {
    pub fn new(inner: BlurScreen, log: SessionLog, limit: u32) -> Self {
        Self {
            inner,
            log,
            limit,
            size: (0, 0),
            hold_resizes: true,
        }
    }

    fn dispose_at(&self) -> u32 {
        self.limit.saturating_sub(2)
    }
}

impl Screen for ScriptedScreen {
    fn resize(&mut self, ctx: &Context, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.size = (width, height);
        }
        if !self.hold_resizes {
            self.inner.resize(ctx, width, height);
        }
    }

    fn render(&mut self, ctx: &Context, frame: Frame<'_>, dt: Duration) -> Out {
        let n = self.log.frames.fetch_add(1, Ordering::SeqCst);
        let (w, h) = self.size;

        if n == 0 {
            self.inner.toggle_pause();
            let out = self.inner.render(ctx, frame, dt);
            let direct = out == Out::Continue
                && self.inner.is_paused()
                && self.inner.target_size().is_none();
            self.log
                .paused_without_targets
                .store(direct, Ordering::SeqCst);

            self.hold_resizes = false;
            self.inner.resize(ctx, w, h);
            return out;
        }

        if n == 1 {
            let targets = self.inner.target_size();
            let resolution = self.inner.blur_resolution();
            self.inner.resize(ctx, 0, 0);
            // A minimised window keeps the previous targets and blur scale.
            let kept = self.inner.target_size() == targets
                && self.inner.blur_resolution() == resolution;
            self.inner.resize(ctx, w, h);
            self.log.zero_resize_survived.store(kept, Ordering::SeqCst);
        }

        if n >= self.dispose_at() {
            if !self.inner.is_disposed() {
                self.inner.dispose();
                self.inner.dispose();
            }
            if self.inner.render(ctx, frame, dt) == Out::Continue && self.inner.is_disposed() {
                self.log.frames_after_dispose.fetch_add(1, Ordering::SeqCst);
            }
        } else {
            self.inner.render(ctx, frame, dt);
            if self.inner.is_paused() && self.inner.blur_amount() > 0.0 {
                self.log.blurred_frames.fetch_add(1, Ordering::SeqCst);
            }
        }

        if n + 1 >= self.limit {
            Out::Exit
        } else {
            Out::Continue
        }
    }

    fn on_window_event(&mut self, ctx: &Context, event: &pause_blur::WindowEvent) -> Out {
        self.inner.on_window_event(ctx, event)
    }

    fn on_device_event(&mut self, ctx: &Context, event: &pause_blur::DeviceEvent) {
        self.inner.on_device_event(ctx, event);
    }

    fn dispose(&mut self) {
        // Already disposed by the script; this call must be a no-op.
        self.inner.dispose();
        self.log
            .disposed
            .store(self.inner.is_disposed(), Ordering::SeqCst);
    }
}
