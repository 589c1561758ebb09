//! Camera acquisition and release (wasm)
//!
//! Thin wrapper over `getUserMedia`: prefers an exact facing-mode match and
//! falls back to a best-effort one, mapping platform rejections onto the
//! sensor error taxonomy.

use js_sys::{Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{MediaStream, MediaStreamConstraints, MediaStreamTrack};

use crate::consts::*;
use crate::session::Facing;

use super::SensorError;

/// Acquire a camera stream for the given facing mode
pub async fn acquire(facing: Facing) -> Result<MediaStream, SensorError> {
    match request(facing, true).await {
        Ok(stream) => Ok(stream),
        Err(first) => {
            log::warn!(
                "exact {} camera unavailable ({:?}), retrying with ideal constraint",
                facing.as_str(),
                first
            );
            request(facing, false).await.map_err(classify)
        }
    }
}

async fn request(facing: Facing, exact: bool) -> Result<MediaStream, JsValue> {
    let devices = web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .navigator()
        .media_devices()?;

    let constraints = MediaStreamConstraints::new();
    constraints.set_video(&video_constraints(facing, exact)?);

    let promise: Promise = devices.get_user_media_with_constraints(&constraints)?;
    let stream = JsFuture::from(promise).await?;
    stream.dyn_into::<MediaStream>()
}

fn video_constraints(facing: Facing, exact: bool) -> Result<JsValue, JsValue> {
    let video = Object::new();
    if exact {
        let mode = Object::new();
        Reflect::set(&mode, &"exact".into(), &facing.as_str().into())?;
        Reflect::set(&video, &"facingMode".into(), &mode)?;
    } else {
        Reflect::set(&video, &"facingMode".into(), &facing.as_str().into())?;
    }
    Reflect::set(&video, &"width".into(), &ideal(CAMERA_IDEAL_WIDTH)?)?;
    Reflect::set(&video, &"height".into(), &ideal(CAMERA_IDEAL_HEIGHT)?)?;
    Reflect::set(&video, &"frameRate".into(), &ideal(CAMERA_IDEAL_FPS)?)?;
    Ok(video.into())
}

fn ideal(value: f64) -> Result<JsValue, JsValue> {
    let constraint = Object::new();
    Reflect::set(&constraint, &"ideal".into(), &value.into())?;
    Ok(constraint.into())
}

/// Map a `getUserMedia` rejection onto the sensor error taxonomy
fn classify(err: JsValue) -> SensorError {
    let name = Reflect::get(&err, &"name".into())
        .ok()
        .and_then(|n| n.as_string())
        .unwrap_or_default();
    match name.as_str() {
        "NotAllowedError" | "SecurityError" | "PermissionDeniedError" => {
            SensorError::PermissionDenied
        }
        _ => SensorError::CameraUnavailable,
    }
}

/// Stop every track on the stream, releasing the hardware
pub fn release(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
}
