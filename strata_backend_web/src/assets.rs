// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font and image loading.
//!
//! Both run as detached futures on the browser's microtask queue. Fonts
//! become visible to layout when they finish; images are delivered to the
//! core as an `Image` interrupt carrying RGBA pixels.

use alloc::format;
use alloc::string::ToString as _;
use alloc::vec::Vec;

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Blob, Document, FontFace, FontFaceDescriptors, ImageBitmap, OffscreenCanvas,
    OffscreenCanvasRenderingContext2d, Response,
};

use strata_core::chassis::CoreLink as _;
use strata_core::dom::{FontFaceRequest, FontSource, ImageRequest};
use strata_core::interrupt::{ImageArgs, NativeInterrupt};

use crate::js_core::JsCore;

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

async fn fetch(url: &str) -> Result<Response, JsValue> {
    let response: Response = JsFuture::from(window()?.fetch_with_str(url))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "{url}: HTTP {}",
            response.status()
        )));
    }
    Ok(response)
}

/// Starts loading a font face into `document`.
pub(crate) fn load_font(document: &Document, request: &FontFaceRequest) {
    let document = document.clone();
    let family = request.family.clone();
    match &request.source {
        FontSource::Stylesheet(url) => {
            let url = url.clone();
            spawn_local(async move {
                if let Err(e) = inject_stylesheet(&document, &url).await {
                    log::warn!("could not load font {family:?} from {url}: {e:?}");
                }
            });
        }
        FontSource::File(url) => {
            let descriptors = FontFaceDescriptors::new();
            if let Some(style) = request.style {
                descriptors.set_style(style.css());
            }
            if let Some(weight) = request.weight {
                descriptors.set_weight(&weight.css().to_string());
            }
            let source = format!("url({url})");
            let face = FontFace::new_with_str_and_descriptors(&family, &source, &descriptors);
            let face = match face {
                Ok(face) => face,
                Err(e) => {
                    log::warn!("invalid font face {family:?}: {e:?}");
                    return;
                }
            };
            spawn_local(async move {
                match add_face(&document, &face).await {
                    Ok(()) => log::debug!("font {family:?} ready"),
                    Err(e) => log::warn!("could not load font {family:?}: {e:?}"),
                }
            });
        }
    }
}

async fn inject_stylesheet(document: &Document, url: &str) -> Result<(), JsValue> {
    let css = JsFuture::from(fetch(url).await?.text()?)
        .await?
        .as_string()
        .unwrap_or_default();
    let style = document.create_element("style")?;
    style.set_text_content(Some(&css));
    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("document has no <head>"))?;
    head.append_child(&style)?;
    Ok(())
}

async fn add_face(document: &Document, face: &FontFace) -> Result<(), JsValue> {
    JsFuture::from(face.load()?).await?;
    document.fonts().add(face)?;
    Ok(())
}

/// Starts fetching an image, retrying on the request's backoff schedule.
///
/// On success the pixels are sent to `core`; when every attempt fails the
/// image is dropped with an error log.
pub(crate) fn load_image(core: JsCore, request: ImageRequest) {
    spawn_local(async move {
        let mut core = core;
        let delays: Vec<u32> = request.retry.delays().collect();
        for (attempt, delay) in delays.iter().copied().enumerate() {
            match decode_image(&request.path).await {
                Ok(image) => {
                    deliver(&mut core, &request, image);
                    return;
                }
                Err(e) => {
                    log::warn!(
                        "image {} attempt {}/{} failed: {e:?}",
                        request.path,
                        attempt + 1,
                        delays.len()
                    );
                }
            }
            if attempt + 1 < delays.len()
                && let Err(e) = sleep(delay).await
            {
                log::warn!("retry timer failed: {e:?}");
                break;
            }
        }
        log::error!("giving up on image {} for element {}", request.path, request.id);
    });
}

struct Decoded {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

fn deliver(core: &mut JsCore, request: &ImageRequest, image: Decoded) {
    let interrupt = NativeInterrupt::Image(ImageArgs::Data {
        id: request.id,
        path: request.path.clone(),
        width: image.width,
        height: image.height,
    });
    match core.send(&interrupt, Some(&image.pixels)) {
        Ok(_) => log::debug!(
            "image {} decoded at {}x{}",
            request.path,
            image.width,
            image.height
        ),
        Err(e) => log::error!("could not deliver image {}: {e}", request.path),
    }
}

async fn decode_image(path: &str) -> Result<Decoded, JsValue> {
    let blob: Blob = JsFuture::from(fetch(path).await?.blob()?).await?.dyn_into()?;
    let bitmap: ImageBitmap = JsFuture::from(window()?.create_image_bitmap_with_blob(&blob)?)
        .await?
        .dyn_into()?;
    let (width, height) = (bitmap.width(), bitmap.height());
    let canvas = OffscreenCanvas::new(width, height)?;
    let context: OffscreenCanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;
    context.draw_image_with_image_bitmap(&bitmap, 0.0, 0.0)?;
    let data = context.get_image_data(0.0, 0.0, f64::from(width), f64::from(height))?;
    bitmap.close();
    Ok(Decoded {
        width,
        height,
        pixels: data.data().0,
    })
}

async fn sleep(ms: u32) -> Result<(), JsValue> {
    let window = window()?;
    let timeout = i32::try_from(ms).unwrap_or(i32::MAX);
    let mut scheduled: Result<i32, JsValue> = Ok(0);
    let promise = Promise::new(&mut |resolve, _reject| {
        scheduled =
            window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, timeout);
    });
    scheduled?;
    JsFuture::from(promise).await?;
    Ok(())
}

