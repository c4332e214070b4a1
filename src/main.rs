//! Arix Tree entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlInputElement, PointerEvent, WheelEvent};

    use arix_tree::renderer::{OrbitCamera, RenderState, pointer_ndc};
    use arix_tree::sim::{FrameInput, SceneState, tick};
    use arix_tree::{Error, SceneConfig};

    /// Fallback frame time for the first frame after start or a hidden tab
    const FIRST_FRAME_DT: f32 = 1.0 / 60.0;

    /// App instance holding all state
    struct App {
        state: SceneState,
        config: SceneConfig,
        camera: OrbitCamera,
        render_state: Option<RenderState>,
        input: FrameInput,
        last_time: f64,
        /// Last pointer position while dragging, in CSS pixels
        drag: Option<(f32, f32)>,
        canvas: HtmlCanvasElement,
    }

    impl App {
        fn new(seed: u64, config: SceneConfig, canvas: HtmlCanvasElement) -> Self {
            Self {
                state: SceneState::new(&config, seed),
                config,
                camera: OrbitCamera::default(),
                render_state: None,
                input: FrameInput::default(),
                last_time: 0.0,
                drag: None,
                canvas,
            }
        }

        fn frame(&mut self, time: f64) {
            self.input.dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                FIRST_FRAME_DT
            };
            self.last_time = time;

            tick(&mut self.state, &self.config, &self.input);
            self.render();
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state, &self.config, &self.camera) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Match the drawing buffer to the canvas' CSS size
        fn fit_canvas(&mut self) {
            let (width, height) = canvas_pixel_size(&self.canvas);
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height);
            }
        }

        fn pointer_moved(&mut self, x: f32, y: f32) {
            let width = self.canvas.client_width() as f32;
            let height = self.canvas.client_height() as f32;
            self.input.pointer = pointer_ndc(x, y, width, height);

            if let Some((last_x, last_y)) = self.drag {
                self.camera
                    .rotate(glam::Vec2::new(x - last_x, y - last_y), height);
                self.drag = Some((x, y));
            }
        }
    }

    fn canvas_pixel_size(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        (width.max(1), height.max(1))
    }

    fn set_active(id: &str, active: bool) {
        let element = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id));
        if let Some(element) = element {
            let _ = element.class_list().toggle_with_force("active", active);
        }
    }

    pub async fn run() -> arix_tree::Result<()> {
        log::info!("Arix Tree starting...");

        let window = web_sys::window().ok_or(Error::MissingElement("window"))?;
        let document = window.document().ok_or(Error::MissingElement("document"))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or(Error::MissingElement("canvas"))?
            .dyn_into()
            .map_err(|_| Error::MissingElement("canvas"))?;

        let (width, height) = canvas_pixel_size(&canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let config = SceneConfig::load();
        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(seed, config, canvas.clone())));

        log::info!("Scene initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height).await?;
        app.borrow_mut().render_state = Some(render_state);

        setup_pointer_handlers(&canvas, app.clone());
        setup_controls(app.clone());
        setup_resize(app.clone());
        setup_visibility(app.clone());

        {
            let a = app.borrow();
            let config = &a.config;
            set_active("spin-btn", config.is_spinning());
            set_active("storm-btn", config.is_snowing);
            if let Some(slider) = document
                .get_element_by_id("bloom-slider")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            {
                slider.set_value(&config.bloom_intensity.to_string());
            }
        }

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        request_animation_frame(app);

        log::info!("Arix Tree running!");
        Ok(())
    }

    fn setup_pointer_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Pointer move: spotlight target, and orbit while dragging
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                app.borrow_mut()
                    .pointer_moved(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Drag start
        {
            let app = app.clone();
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let _ = target.set_pointer_capture(event.pointer_id());
                app.borrow_mut().drag = Some((event.offset_x() as f32, event.offset_y() as f32));
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Drag end
        for name in ["pointerup", "pointercancel"] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                app.borrow_mut().drag = None;
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Zoom
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: WheelEvent| {
                event.prevent_default();
                app.borrow_mut().camera.zoom(event.delta_y() as f32);
            });
            let _ = canvas.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_controls(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("spin-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut a = app.borrow_mut();
                a.config.toggle_spin();
                set_active("spin-btn", a.config.is_spinning());
                log::info!("Spin speed: {}", a.config.spin_speed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("storm-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut a = app.borrow_mut();
                a.config.toggle_snow();
                set_active("storm-btn", a.config.is_snowing);
                log::info!("Storm mode: {}", a.config.is_snowing);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(slider) = document
            .get_element_by_id("bloom-slider")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            let input = slider.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Ok(value) = input.value().parse::<f32>() {
                    app.borrow_mut().config.set_bloom_intensity(value);
                }
            });
            let _ = slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().fit_canvas();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Restart frame timing when the tab comes back so the first frame
    /// doesn't see the whole hidden interval
    fn setup_visibility(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let doc = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if doc.visibility_state() == web_sys::VisibilityState::Visible {
                app.borrow_mut().last_time = 0.0;
                log::debug!("Tab visible, frame timing reset");
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }

    /// Put a startup failure where the loading text was
    pub fn show_error(error: &Error) {
        let element = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("loading"));
        if let Some(element) = element {
            element.set_text_content(Some(&format!("Unable to start: {error}")));
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    if let Err(e) = wasm_app::run().await {
        log::error!("Startup failed: {}", e);
        wasm_app::show_error(&e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Arix Tree (native) starting...");
    log::info!("Native mode has no window - run with `trunk serve` for the web version");

    headless_preview();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Tick the scene for a few simulated seconds and log what would be drawn
#[cfg(not(target_arch = "wasm32"))]
fn headless_preview() {
    use arix_tree::SceneConfig;
    use arix_tree::renderer::instances::{SceneInstances, build_instances};
    use arix_tree::sim::{FrameInput, SceneState, tick};

    const FRAMES: u32 = 180;

    let mut config = SceneConfig::load();
    let mut state = SceneState::new(&config, 0x7AEE);
    let mut instances = SceneInstances::default();
    let input = FrameInput {
        pointer: glam::Vec2::new(0.5, 0.25),
        dt: 1.0 / 60.0,
    };

    for frame in 0..FRAMES {
        if frame == FRAMES / 2 {
            config.toggle_snow();
            log::info!("Storm mode: {}", config.is_snowing);
        }
        tick(&mut state, &config, &input);
    }

    build_instances(&state, &mut instances);
    log::info!(
        "After {} frames: elapsed={:.2}s spin={:.3}rad dust={} instances={}",
        state.frame,
        state.elapsed,
        state.spin.angle,
        state.particles.len(),
        instances.total()
    );
    println!(
        "{} ornaments, {} dust motes, {} stars, {} instances",
        state.ornaments.len(),
        state.particles.len(),
        state.stars.len(),
        instances.total()
    );
}
