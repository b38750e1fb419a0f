//! Roller entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::Clamped;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, ImageData,
        KeyboardEvent, TouchEvent,
    };

    use roller::platform::{AssetLoader, Command};
    use roller::renderer::{Canvas, Color, Rect, Transform, Viewport};
    use roller::sim::{Image, Overlay, SpriteId};
    use roller::{Session, Tuning};

    /// 2D canvas context plus the uploaded sprite and overlay images
    struct WebCanvas {
        ctx: CanvasRenderingContext2d,
        sprites: HashMap<SpriteId, HtmlImageElement>,
        overlay: HtmlCanvasElement,
        overlay_ctx: CanvasRenderingContext2d,
        overlay_revision: Option<u32>,
    }

    impl WebCanvas {
        fn upload_overlay(&mut self, overlay: &Overlay) -> Result<(), JsValue> {
            let image = &overlay.image;
            if self.overlay.width() != image.width() || self.overlay.height() != image.height() {
                self.overlay.set_width(image.width());
                self.overlay.set_height(image.height());
            }
            let data = ImageData::new_with_u8_clamped_array_and_sh(
                Clamped(image.as_bytes()),
                image.width(),
                image.height(),
            )?;
            self.overlay_ctx.put_image_data(&data, 0.0, 0.0)?;
            self.overlay_revision = Some(overlay.revision);
            Ok(())
        }
    }

    impl Canvas for WebCanvas {
        fn fill_rect(&mut self, color: Color, rect: Rect) {
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill_rect(
                rect.origin.x as f64,
                rect.origin.y as f64,
                rect.size.x as f64,
                rect.size.y as f64,
            );
        }

        fn draw_sprite(&mut self, sprite: &SpriteId, size: Vec2) {
            // Failed loads have no image; the body is simply not drawn
            let Some(image) = self.sprites.get(sprite) else {
                return;
            };
            let _ = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
                image,
                (-size.x / 2.0) as f64,
                (-size.y / 2.0) as f64,
                size.x as f64,
                size.y as f64,
            );
        }

        fn draw_overlay(&mut self, overlay: &Overlay, size: Vec2) {
            if self.overlay_revision != Some(overlay.revision) {
                if let Err(e) = self.upload_overlay(overlay) {
                    log::warn!("Overlay upload failed: {:?}", e);
                    return;
                }
            }
            let _ = self.ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
                &self.overlay,
                (-size.x / 2.0) as f64,
                (-size.y / 2.0) as f64,
                size.x as f64,
                size.y as f64,
            );
        }

        fn push_transform(&mut self, transform: Transform) {
            self.ctx.save();
            let _ = self
                .ctx
                .translate(transform.translate.x as f64, transform.translate.y as f64);
            let _ = self.ctx.rotate(transform.rotate as f64);
            let _ = self
                .ctx
                .scale(transform.scale as f64, transform.scale as f64);
        }

        fn pop_transform(&mut self) {
            self.ctx.restore();
        }
    }

    struct Game {
        session: Session,
        canvas: WebCanvas,
        element: HtmlCanvasElement,
    }

    impl Game {
        /// Match the backing store to the element's layout size
        fn fit_to_element(&mut self) {
            let width = self.element.client_width().max(1) as u32;
            let height = self.element.client_height().max(1) as u32;
            self.element.set_width(width);
            self.element.set_height(height);
            self.session
                .resize(Viewport::new(width as f32, height as f32));
        }
    }

    fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
        canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsValue::from_str("not a 2d context"))
    }

    fn create_canvas(document: &Document) -> Result<HtmlCanvasElement, JsValue> {
        document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str("not a canvas"))
    }

    /// Start loading one sprite; the promise settles on load or error
    fn load_image(name: &str) -> Result<(HtmlImageElement, js_sys::Promise), JsValue> {
        let image = HtmlImageElement::new()?;
        let promise = js_sys::Promise::new(&mut |resolve, reject| {
            image.set_onload(Some(&resolve));
            image.set_onerror(Some(&reject));
        });
        image.set_src(&format!("assets/{}.png", name));
        Ok((image, promise))
    }

    /// Read decoded pixels back through a scratch canvas
    fn image_pixels(
        scratch: &HtmlCanvasElement,
        ctx: &CanvasRenderingContext2d,
        image: &HtmlImageElement,
    ) -> Result<Image, JsValue> {
        let (w, h) = (image.natural_width(), image.natural_height());
        scratch.set_width(w);
        scratch.set_height(h);
        ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
        ctx.draw_image_with_html_image_element(image, 0.0, 0.0)?;
        let data = ctx.get_image_data(0.0, 0.0, w as f64, h as f64)?;
        Image::from_rgba8(w, h, &data.data().0)
            .ok_or_else(|| JsValue::from_str("pixel buffer size mismatch"))
    }

    pub async fn run() -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let tuning = Tuning::default();
        let names = tuning.sprite_names();

        let mut pending = Vec::with_capacity(names.len());
        for name in &names {
            let (image, promise) = load_image(name)?;
            pending.push((name.clone(), image, promise));
        }

        let scratch = create_canvas(&document)?;
        let scratch_ctx = context_2d(&scratch)?;
        let mut loader = AssetLoader::new(names.iter().cloned());
        let mut images = HashMap::new();
        for (name, image, promise) in pending {
            let settled = match JsFuture::from(promise).await {
                Ok(_) => image_pixels(&scratch, &scratch_ctx, &image)
                    .map_err(|e| format!("{:?}", e))
                    .and_then(|pixels| loader.loaded(&name, pixels).map_err(|e| e.to_string())),
                Err(e) => Err(format!("{:?}", e)),
            };
            match settled {
                Ok(()) => {
                    images.insert(SpriteId::new(name), image);
                }
                Err(reason) => {
                    let _ = loader.failed(&name, reason);
                }
            }
        }
        if !loader.take_completion() {
            log::warn!("{} sprites never settled", loader.pending());
        }
        let atlas = loader.finish();

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let element: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()
            .map_err(|_| JsValue::from_str("not a canvas"))?;
        let overlay = create_canvas(&document)?;
        let canvas = WebCanvas {
            ctx: context_2d(&element)?,
            sprites: images,
            overlay_ctx: context_2d(&overlay)?,
            overlay,
            overlay_revision: None,
        };

        let seed = js_sys::Date::now() as u64;
        let watchdog_period = tuning.watchdog_period_ms;
        let session = Session::new(tuning, seed, atlas, Viewport::new(1.0, 1.0))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let game = Rc::new(RefCell::new(Game {
            session,
            canvas,
            element: element.clone(),
        }));
        game.borrow_mut().fit_to_element();

        setup_input_handlers(&element, game.clone())?;
        setup_resize(game.clone())?;
        setup_watchdog(game.clone(), watchdog_period)?;

        if game.borrow_mut().session.start() {
            request_animation_frame(game);
            log::info!("Roller running with seed {}", seed);
        }
        Ok(())
    }

    fn setup_input_handlers(
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(command) = Command::from_key(&event.key()) {
                    event.prevent_default();
                    game.borrow_mut().session.command(command);
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch: left third, middle, right third
        {
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let width = canvas_clone.client_width() as f32;
                    if let Some(command) = Command::from_touch(x, width) {
                        game.borrow_mut().session.command(command);
                    }
                }
            });
            canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_resize(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().fit_to_element();
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// Background timer that keeps physics moving when frames stop arriving
    fn setup_watchdog(game: Rc<RefCell<Game>>, period_ms: u32) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let closure = Closure::<dyn FnMut()>::new(move || {
            let Some(now) = web_sys::window()
                .and_then(|w| w.performance())
                .map(|p| p.now())
            else {
                return;
            };
            game.borrow_mut().session.watchdog(now);
        });
        window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            period_ms as i32,
        )?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(game: Rc<RefCell<Game>>, time: f64) {
        let again = {
            let mut g = game.borrow_mut();
            let Game {
                session, canvas, ..
            } = &mut *g;
            session.frame(time, canvas)
        };
        if again {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("Roller starting...");
    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Roller (native) starting headless...");
    if let Err(e) = headless::run(std::env::args().skip(1).collect()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

/// Synthetic 60 Hz run with scripted steering, painted to a recording canvas
///
/// Usage: `roller [seconds] [seed] [tuning.json]`
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use roller::platform::{Command, placeholder_atlas};
    use roller::renderer::{RecordingCanvas, Viewport};
    use roller::{Session, Tuning};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    pub fn run(args: Vec<String>) -> Result<(), String> {
        let seconds: f64 = match args.first() {
            Some(s) => s.parse().map_err(|_| format!("bad duration '{}'", s))?,
            None => 30.0,
        };
        let seed: u64 = match args.get(1) {
            Some(s) => s.parse().map_err(|_| format!("bad seed '{}'", s))?,
            None => 42,
        };
        let tuning = match args.get(2) {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| format!("cannot read {}: {}", path, e))?;
                Tuning::from_json(&json).map_err(|e| e.to_string())?
            }
            None => Tuning::default(),
        };

        let names = tuning.sprite_names();
        let atlas = placeholder_atlas(names.iter().map(String::as_str));
        let mut session = Session::new(tuning, seed, atlas, Viewport::new(800.0, 600.0))
            .map_err(|e| e.to_string())?;
        let mut canvas = RecordingCanvas::default();
        session.start();

        let frames = (seconds * 60.0).round() as u64;
        let mut draw_calls = 0;
        for frame in 0..frames {
            // Push right every half second and hop every three
            if frame % 30 == 0 {
                session.command(Command::SteerRight);
            }
            if frame % 180 == 90 {
                session.command(Command::Jump);
            }
            canvas.clear();
            if !session.frame(frame as f64 * FRAME_MS, &mut canvas) {
                break;
            }
            draw_calls += canvas.ops.len();
        }

        let world = session.world();
        let roller = world.roller();
        log::info!(
            "{:.0} s: roller radius {:.2} at x {:.1}, {} absorbed, camera scale {}, {} draw calls",
            seconds,
            roller.radius,
            roller.pos.x,
            world.absorbed,
            world.camera_scale,
            draw_calls
        );
        Ok(())
    }
}
