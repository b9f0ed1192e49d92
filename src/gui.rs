//! A simple, high-level GUI for presenting camera frames.
//!
//! The GUI event loop has to run on the main thread, so [`run`] takes over the calling thread and
//! executes the application code on a separate thread. Images are handed to the event loop through
//! [`show_image`]; key presses and window lifecycle changes flow back through [`quit_requested`]
//! and [`window_visible`].

mod renderer;

use std::{
    collections::{HashMap, HashSet},
    panic::{catch_unwind, AssertUnwindSafe},
    process,
    rc::Rc,
    sync::Mutex,
};

use anyhow::anyhow;
use once_cell::sync::{Lazy, OnceCell};
use winit::{
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopClosed, EventLoopProxy},
    window::WindowId,
};

use crate::{image::Image, resolution::Resolution, termination::Termination};

use self::renderer::{Gpu, Renderer, Window};

/// Options applied to windows opened by [`show_image`].
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowOptions {
    inner_size: Option<Resolution>,
    position: Option<(i32, i32)>,
}

impl WindowOptions {
    /// Sets the initial inner size of the window, in pixels.
    ///
    /// By default, windows open at the resolution of the first image shown in them.
    pub fn inner_size(mut self, width: u32, height: u32) -> Self {
        self.inner_size = Some(Resolution::new(width, height));
        self
    }

    /// Sets the initial position of the window on the screen.
    pub fn position(mut self, x: i32, y: i32) -> Self {
        self.position = Some((x, y));
        self
    }
}

struct Gui {
    gpu: Rc<Gpu>,
    opts: WindowOptions,
    windows: HashMap<String, Renderer>,
    win_id_to_key: HashMap<WindowId, String>,
}

impl Gui {
    fn new(opts: WindowOptions) -> Self {
        Self {
            gpu: Rc::new(pollster::block_on(Gpu::open()).unwrap()),
            opts,
            windows: HashMap::new(),
            win_id_to_key: HashMap::new(),
        }
    }

    fn run(mut self, event_loop: EventLoop<Msg>) -> ! {
        event_loop.run(move |event, target, flow| {
            *flow = ControlFlow::Wait;
            match event {
                Event::UserEvent(msg) => match msg {
                    Msg::Image { key, res, data } => {
                        if state().map_or(true, |state| state.closed.contains(&key)) {
                            // The user closed this window; images drawn to it are dropped.
                            return;
                        }

                        let renderer = self.windows.entry(key.clone()).or_insert_with(|| {
                            log::debug!("creating window for image '{key}' at {res}");

                            let win = Window::open(target, &key, res, &self.opts).unwrap();
                            let win_id = win.win.id();
                            let renderer = Renderer::new(win, self.gpu.clone()).unwrap();

                            self.win_id_to_key.insert(win_id, key.clone());

                            renderer
                        });

                        renderer.update_texture(res, &data);
                        renderer.window().request_redraw();
                    }
                },
                Event::WindowEvent { window_id, event } => match event {
                    WindowEvent::CloseRequested => {
                        if let Some(key) = self.win_id_to_key.remove(&window_id) {
                            log::debug!("window '{key}' closed");
                            self.windows.remove(&key);
                            if let Ok(mut state) = state() {
                                state.closed.insert(key);
                            }
                        }
                    }
                    WindowEvent::Resized(_) => {
                        if let Some(key) = self.win_id_to_key.get(&window_id) {
                            self.windows.get_mut(key).unwrap().recreate_swapchain();
                        }
                    }
                    WindowEvent::KeyboardInput {
                        input:
                            KeyboardInput {
                                state: ElementState::Pressed,
                                virtual_keycode: Some(VirtualKeyCode::Q),
                                ..
                            },
                        ..
                    } => {
                        if let Ok(mut state) = state() {
                            state.quit = true;
                        }
                    }
                    _ => {}
                },
                Event::RedrawRequested(window_id) => {
                    if let Some(key) = self.win_id_to_key.get(&window_id) {
                        self.windows.get_mut(key).unwrap().redraw();
                    }
                }
                _ => {}
            }
        });
    }
}

#[derive(Debug)]
enum Msg {
    Image {
        key: String,
        res: Resolution,
        data: Vec<u8>,
    },
}

static PROXY: OnceCell<Mutex<EventLoopProxy<Msg>>> = OnceCell::new();

#[derive(Default)]
struct SharedState {
    quit: bool,
    closed: HashSet<String>,
}

static STATE: Lazy<Mutex<SharedState>> = Lazy::new(Default::default);

fn state() -> Result<std::sync::MutexGuard<'static, SharedState>, anyhow::Error> {
    STATE
        .lock()
        .map_err(|_| anyhow!("GUI state lock is poisoned"))
}

fn send(msg: Msg) {
    PROXY
        .get()
        .expect("GUI not initialized (`gui::run` was not called)")
        .lock()
        .unwrap()
        .send_event(msg)
        .map_err(|_closed| EventLoopClosed(()))
        .unwrap();
}

/// Runs the GUI event loop on the calling thread and `cb` on a new thread.
///
/// This never returns; when `cb` finishes or panics, the process exits with a matching exit code.
pub fn run<F, R>(opts: WindowOptions, cb: F) -> !
where
    F: FnOnce() -> R + Send + 'static,
    R: Termination + Send,
{
    let event_loop = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();
    PROXY
        .set(Mutex::new(proxy))
        .ok()
        .expect("GUI already initialized");

    // The GUI is now initialized; spawn another thread to run the application code.
    std::thread::spawn(move || {
        let result = catch_unwind(AssertUnwindSafe(cb));
        match result {
            Ok(r) => {
                if r.is_success() {
                    process::exit(0);
                } else {
                    r.report(); // may print the error message
                    process::exit(1);
                }
            }
            Err(_payload) => {
                // Panic handler has printed the panic message and backtrace already, exit with 101
                // to mimic libstd behavior.
                process::exit(101);
            }
        }
    });

    let gui = Gui::new(opts);
    gui.run(event_loop);
}

/// Displays an image in a window.
///
/// The window is created when the first image is shown in it. Once the user closes the window, it
/// stays closed and later images for the same `key` are dropped.
pub fn show_image(key: impl Into<String>, image: &Image) {
    // Image data is RGBA8 internally so that no conversion before GPU upload is needed.
    let data = image.data().to_vec();

    send(Msg::Image {
        key: key.into(),
        res: Resolution::new(image.width(), image.height()),
        data,
    });
}

/// Returns whether the user pressed the quit key in any window.
///
/// If the GUI state is unavailable, this conservatively reports `true`.
pub fn quit_requested() -> bool {
    state().map(|state| state.quit).unwrap_or(true)
}

/// Returns whether the window identified by `key` is still open.
///
/// Windows that have not been created yet count as open. An `Err` is returned when the GUI state
/// cannot be queried at all; callers should treat that as a shutdown signal.
pub fn window_visible(key: &str) -> anyhow::Result<bool> {
    Ok(!state()?.closed.contains(key))
}
