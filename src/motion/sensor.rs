//! Camera-driven motion sensor (wasm)
//!
//! Owns the capture pipeline: acquires a stream, draws each video frame into
//! a small probe canvas, runs the frame analyzer, and publishes samples to
//! the input slot. The sampling loop runs on `requestAnimationFrame`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, MediaStream};

use crate::consts::*;
use crate::session::Facing;

use super::{camera, FrameAnalyzer, InputSlot, SensorError};

/// Cloneable handle to the sensor. All interior state sits behind `Rc` so a
/// clone can drive async camera acquisition without holding any borrow
/// across an await (the sampling loop may fire in between).
#[derive(Clone)]
pub struct MotionSensor {
    video: HtmlVideoElement,
    ctx: CanvasRenderingContext2d,
    analyzer: Rc<RefCell<FrameAnalyzer>>,
    output: InputSlot,
    stream: Rc<RefCell<Option<MediaStream>>>,
    active: Rc<Cell<bool>>,
    raf_id: Rc<Cell<Option<i32>>>,
    /// Bumped on every stop; an old sampling loop that outlived its
    /// cancellation sees a stale epoch and exits
    epoch: Rc<Cell<u64>>,
}

impl MotionSensor {
    /// Build a sensor around an (offscreen) video element. Creates its own
    /// probe canvas at the analysis resolution.
    pub fn new(video: HtmlVideoElement, output: InputSlot) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let probe: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        probe.set_width(SENSE_WIDTH);
        probe.set_height(SENSE_HEIGHT);

        // Read-back heavy context: every frame goes straight to get_image_data
        let options = js_sys::Object::new();
        js_sys::Reflect::set(&options, &"willReadFrequently".into(), &true.into())?;
        let ctx = probe
            .get_context_with_context_options("2d", &options)?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        Ok(Self {
            video,
            ctx,
            analyzer: Rc::new(RefCell::new(FrameAnalyzer::default())),
            output,
            stream: Rc::new(RefCell::new(None)),
            active: Rc::new(Cell::new(false)),
            raf_id: Rc::new(Cell::new(None)),
            epoch: Rc::new(Cell::new(0)),
        })
    }

    /// Acquire the camera and start the sampling loop. Any previously held
    /// stream is released first, so this doubles as a facing switch.
    pub async fn initialize(&self, facing: Facing) -> Result<(), SensorError> {
        self.stop();

        let stream = camera::acquire(facing).await?;
        self.video.set_src_object(Some(&stream));

        if let Err(err) = wait_for_playback(&self.video).await {
            camera::release(&stream);
            self.video.set_src_object(None);
            return Err(err);
        }

        *self.stream.borrow_mut() = Some(stream);
        self.analyzer.borrow_mut().begin_stream(facing.is_mirrored());
        self.active.set(true);
        self.start_loop();
        log::info!("motion sensor running ({} camera)", facing.as_str());
        Ok(())
    }

    /// Halt the sampling loop and release the camera. Idempotent.
    pub fn stop(&self) {
        self.active.set(false);
        self.epoch.set(self.epoch.get() + 1);
        if let Some(id) = self.raf_id.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
        if let Some(stream) = self.stream.borrow_mut().take() {
            camera::release(&stream);
            self.video.set_src_object(None);
            log::info!("motion sensor stopped, camera released");
        }
    }

    fn start_loop(&self) {
        let sensor = self.clone();
        let epoch = self.epoch.get();
        let handle: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let first = handle.clone();

        *first.borrow_mut() = Some(Closure::new(move || {
            if !sensor.active.get() || sensor.epoch.get() != epoch {
                return;
            }
            sensor.process_frame();
            if let Some(window) = web_sys::window() {
                if let Some(cb) = handle.borrow().as_ref() {
                    if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        sensor.raf_id.set(Some(id));
                    }
                }
            }
        }));

        if let Some(window) = web_sys::window() {
            if let Some(cb) = first.borrow().as_ref() {
                if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    self.raf_id.set(Some(id));
                }
            }
        }
    }

    fn process_frame(&self) {
        // A paused or not-yet-decodable source yields no sample this frame
        if self.video.paused() || self.video.ready_state() < 2 {
            return;
        }

        if self
            .ctx
            .draw_image_with_html_video_element_and_dw_and_dh(
                &self.video,
                0.0,
                0.0,
                SENSE_WIDTH as f64,
                SENSE_HEIGHT as f64,
            )
            .is_err()
        {
            return;
        }

        let image = match self
            .ctx
            .get_image_data(0.0, 0.0, SENSE_WIDTH as f64, SENSE_HEIGHT as f64)
        {
            Ok(image) => image,
            Err(_) => return,
        };
        let data = image.data();

        if let Some(sample) = self.analyzer.borrow_mut().process(&data) {
            self.output.publish(sample);
        }
    }
}

/// Wait until the video has metadata and playback has started, bounded by
/// the stream-ready timeout.
async fn wait_for_playback(video: &HtmlVideoElement) -> Result<(), SensorError> {
    // HAVE_METADATA (1) or later means dimensions are known
    if video.ready_state() < 1 {
        let promise = js_sys::Promise::new(&mut |resolve, reject| {
            let loaded = Closure::once_into_js(move || {
                let _ = resolve.call0(&JsValue::NULL);
            });
            let _ = video
                .add_event_listener_with_callback("loadedmetadata", loaded.unchecked_ref());

            let expired = Closure::once_into_js(move || {
                let _ = reject.call0(&JsValue::NULL);
            });
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    expired.unchecked_ref(),
                    STREAM_READY_TIMEOUT_MS,
                );
            }
        });
        JsFuture::from(promise)
            .await
            .map_err(|_| SensorError::StreamReadyTimeout)?;
    }

    let playing = video
        .play()
        .map_err(|_| SensorError::StreamReadyTimeout)?;
    JsFuture::from(playing)
        .await
        .map_err(|_| SensorError::StreamReadyTimeout)?;
    Ok(())
}
