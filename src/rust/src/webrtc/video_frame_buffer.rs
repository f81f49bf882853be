//
// Copyright 2024 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Video frame buffer variants.
//!
//! A buffer either owns its pixel data on the CPU (planar I420, semi-planar
//! NV12/NV21), references a GPU texture, or wraps an engine-owned native
//! buffer. CPU and texture buffers carry a [`RefCountDelegate`] because they
//! are shared across decoder, renderer, and application threads; native
//! buffers ride the engine's own ref count through [`webrtc::Arc`].
//!
//! Crop-and-scale always produces a new buffer. It never mutates in place.

use std::sync::Arc;

use crate::common::Result;
use crate::error::NativeRtcError;
use crate::webrtc;
use crate::webrtc::ref_count::{RefCountDelegate, ReleaseCallback};

#[cfg(not(feature = "sim"))]
use crate::webrtc::ffi::media;
#[cfg(feature = "sim")]
use crate::webrtc::sim::media;

fn chroma_size(size: u32) -> u32 {
    (size + 1) / 2
}

fn check_crop_region(
    width: u32,
    height: u32,
    crop_x: u32,
    crop_y: u32,
    crop_width: u32,
    crop_height: u32,
    scale_width: u32,
    scale_height: u32,
) -> Result<()> {
    if scale_width == 0 || scale_height == 0 {
        return Err(NativeRtcError::InvalidScaleDimensions(scale_width, scale_height).into());
    }
    let x_end = crop_x.checked_add(crop_width);
    let y_end = crop_y.checked_add(crop_height);
    if crop_width == 0
        || crop_height == 0
        || x_end.map_or(true, |end| end > width)
        || y_end.map_or(true, |end| end > height)
    {
        return Err(NativeRtcError::InvalidCropRegion {
            crop_x,
            crop_y,
            crop_width,
            crop_height,
            width,
            height,
        }
        .into());
    }
    Ok(())
}

/// Nearest-neighbor resample of a cropped plane region into a destination
/// plane. Good enough for the binding layer; callers wanting better
/// filtering go through the engine.
fn scale_plane(
    src: &[u8],
    src_stride: usize,
    crop_x: usize,
    crop_y: usize,
    crop_width: usize,
    crop_height: usize,
    dst: &mut [u8],
    dst_stride: usize,
    dst_width: usize,
    dst_height: usize,
) {
    for y in 0..dst_height {
        let src_y = crop_y + y * crop_height / dst_height;
        let src_row = &src[src_y * src_stride..];
        let dst_row = &mut dst[y * dst_stride..y * dst_stride + dst_width];
        for (x, out) in dst_row.iter_mut().enumerate() {
            let src_x = crop_x + x * crop_width / dst_width;
            *out = src_row[src_x];
        }
    }
}

fn rotate_plane(
    src: &[u8],
    src_stride: usize,
    width: usize,
    height: usize,
    dst: &mut [u8],
    dst_stride: usize,
    rotation: Rotation,
) {
    match rotation {
        Rotation::None => {
            for y in 0..height {
                dst[y * dst_stride..y * dst_stride + width]
                    .copy_from_slice(&src[y * src_stride..y * src_stride + width]);
            }
        }
        Rotation::Clockwise90 => {
            // Destination is height x width.
            for r in 0..width {
                for c in 0..height {
                    dst[r * dst_stride + c] = src[(height - 1 - c) * src_stride + r];
                }
            }
        }
        Rotation::Clockwise180 => {
            for r in 0..height {
                for c in 0..width {
                    dst[r * dst_stride + c] = src[(height - 1 - r) * src_stride + (width - 1 - c)];
                }
            }
        }
        Rotation::Clockwise270 => {
            for r in 0..width {
                for c in 0..height {
                    dst[r * dst_stride + c] = src[c * src_stride + (width - 1 - r)];
                }
            }
        }
    }
}

/// Frame rotation, measured clockwise from the capture orientation.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, num_enum::TryFromPrimitive)]
pub enum Rotation {
    None = 0,
    Clockwise90 = 90,
    Clockwise180 = 180,
    Clockwise270 = 270,
}

/// Planar YUV 4:2:0 pixel data with per-plane strides.
pub struct I420Buffer {
    width: u32,
    height: u32,
    stride_y: u32,
    stride_u: u32,
    stride_v: u32,
    data: Arc<Vec<u8>>,
    ref_count: Arc<RefCountDelegate>,
}

impl I420Buffer {
    pub fn allocate(width: u32, height: u32) -> Self {
        let chroma_height = chroma_size(height) as usize;
        let stride_y = width;
        let stride_u = chroma_size(width);
        let stride_v = stride_u;
        let size = stride_y as usize * height as usize
            + (stride_u as usize + stride_v as usize) * chroma_height;
        Self {
            width,
            height,
            stride_y,
            stride_u,
            stride_v,
            data: Arc::new(vec![0; size]),
            ref_count: Arc::new(RefCountDelegate::new(None)),
        }
    }

    /// Wraps externally produced pixel data (tightly packed planes).
    pub fn wrap(
        width: u32,
        height: u32,
        data: Vec<u8>,
        release_callback: Option<ReleaseCallback>,
    ) -> Result<Self> {
        let needed = width as usize * height as usize
            + 2 * chroma_size(width) as usize * chroma_size(height) as usize;
        if data.len() < needed {
            return Err(NativeRtcError::BufferTooSmall(data.len(), needed).into());
        }
        Ok(Self {
            width,
            height,
            stride_y: width,
            stride_u: chroma_size(width),
            stride_v: chroma_size(width),
            data: Arc::new(data),
            ref_count: Arc::new(RefCountDelegate::new(release_callback)),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn chroma_width(&self) -> u32 {
        chroma_size(self.width)
    }

    pub fn chroma_height(&self) -> u32 {
        chroma_size(self.height)
    }

    fn u_offset(&self) -> usize {
        self.stride_y as usize * self.height as usize
    }

    fn v_offset(&self) -> usize {
        self.u_offset() + self.stride_u as usize * self.chroma_height() as usize
    }

    pub fn data_y(&self) -> &[u8] {
        &self.data[..self.u_offset()]
    }

    pub fn data_u(&self) -> &[u8] {
        &self.data[self.u_offset()..self.v_offset()]
    }

    pub fn data_v(&self) -> &[u8] {
        let v_offset = self.v_offset();
        &self.data[v_offset..v_offset + self.stride_v as usize * self.chroma_height() as usize]
    }

    pub fn ref_count(&self) -> &Arc<RefCountDelegate> {
        &self.ref_count
    }

    pub fn crop_and_scale(
        &self,
        crop_x: u32,
        crop_y: u32,
        crop_width: u32,
        crop_height: u32,
        scale_width: u32,
        scale_height: u32,
    ) -> Result<I420Buffer> {
        check_crop_region(
            self.width,
            self.height,
            crop_x,
            crop_y,
            crop_width,
            crop_height,
            scale_width,
            scale_height,
        )?;
        let mut scaled = I420Buffer::allocate(scale_width, scale_height);
        {
            let dst = Arc::get_mut(&mut scaled.data).expect("freshly allocated buffer is unshared");
            let (dst_y, dst_chroma) =
                dst.split_at_mut(scale_width as usize * scale_height as usize);
            let (dst_u, dst_v) = dst_chroma.split_at_mut(
                chroma_size(scale_width) as usize * chroma_size(scale_height) as usize,
            );
            scale_plane(
                self.data_y(),
                self.stride_y as usize,
                crop_x as usize,
                crop_y as usize,
                crop_width as usize,
                crop_height as usize,
                dst_y,
                scale_width as usize,
                scale_width as usize,
                scale_height as usize,
            );
            let chroma_args = (
                crop_x as usize / 2,
                crop_y as usize / 2,
                chroma_size(crop_width) as usize,
                chroma_size(crop_height) as usize,
                chroma_size(scale_width) as usize,
                chroma_size(scale_height) as usize,
            );
            scale_plane(
                self.data_u(),
                self.stride_u as usize,
                chroma_args.0,
                chroma_args.1,
                chroma_args.2,
                chroma_args.3,
                dst_u,
                chroma_args.4,
                chroma_args.4,
                chroma_args.5,
            );
            scale_plane(
                self.data_v(),
                self.stride_v as usize,
                chroma_args.0,
                chroma_args.1,
                chroma_args.2,
                chroma_args.3,
                dst_v,
                chroma_args.4,
                chroma_args.4,
                chroma_args.5,
            );
        }
        Ok(scaled)
    }

    /// Copies this buffer into a new one rotated clockwise by `rotation`.
    pub fn rotate(&self, rotation: Rotation) -> I420Buffer {
        let (dst_width, dst_height) = match rotation {
            Rotation::None | Rotation::Clockwise180 => (self.width, self.height),
            Rotation::Clockwise90 | Rotation::Clockwise270 => (self.height, self.width),
        };
        let mut rotated = I420Buffer::allocate(dst_width, dst_height);
        {
            let dst = Arc::get_mut(&mut rotated.data).expect("freshly allocated buffer is unshared");
            let (dst_y, dst_chroma) = dst.split_at_mut(dst_width as usize * dst_height as usize);
            let (dst_u, dst_v) = dst_chroma
                .split_at_mut(chroma_size(dst_width) as usize * chroma_size(dst_height) as usize);
            rotate_plane(
                self.data_y(),
                self.stride_y as usize,
                self.width as usize,
                self.height as usize,
                dst_y,
                dst_width as usize,
                rotation,
            );
            rotate_plane(
                self.data_u(),
                self.stride_u as usize,
                self.chroma_width() as usize,
                self.chroma_height() as usize,
                dst_u,
                chroma_size(dst_width) as usize,
                rotation,
            );
            rotate_plane(
                self.data_v(),
                self.stride_v as usize,
                self.chroma_width() as usize,
                self.chroma_height() as usize,
                dst_v,
                chroma_size(dst_width) as usize,
                rotation,
            );
        }
        rotated
    }
}

/// Semi-planar YUV 4:2:0 with interleaved UV chroma, as produced by most
/// hardware decoders.
pub struct Nv12Buffer {
    width: u32,
    height: u32,
    stride: u32,
    slice_height: u32,
    data: Arc<Vec<u8>>,
    ref_count: Arc<RefCountDelegate>,
}

/// Same layout as NV12 with the chroma samples in VU order, as produced by
/// Android camera capture.
pub struct Nv21Buffer {
    width: u32,
    height: u32,
    data: Arc<Vec<u8>>,
    ref_count: Arc<RefCountDelegate>,
}

fn semiplanar_to_i420(
    width: u32,
    height: u32,
    stride: u32,
    slice_height: u32,
    data: &[u8],
    swap_uv: bool,
) -> I420Buffer {
    let mut buffer = I420Buffer::allocate(width, height);
    let chroma_width = chroma_size(width) as usize;
    let chroma_height = chroma_size(height) as usize;
    let uv_offset = stride as usize * slice_height as usize;
    {
        let dst = Arc::get_mut(&mut buffer.data).expect("freshly allocated buffer is unshared");
        let (dst_y, dst_chroma) = dst.split_at_mut(width as usize * height as usize);
        let (dst_u, dst_v) = dst_chroma.split_at_mut(chroma_width * chroma_height);
        for y in 0..height as usize {
            dst_y[y * width as usize..(y + 1) * width as usize]
                .copy_from_slice(&data[y * stride as usize..y * stride as usize + width as usize]);
        }
        for cy in 0..chroma_height {
            let src_row = &data[uv_offset + cy * stride as usize..];
            for cx in 0..chroma_width {
                let first = src_row[2 * cx];
                let second = src_row[2 * cx + 1];
                let (u, v) = if swap_uv { (second, first) } else { (first, second) };
                dst_u[cy * chroma_width + cx] = u;
                dst_v[cy * chroma_width + cx] = v;
            }
        }
    }
    buffer
}

impl Nv12Buffer {
    /// Wraps decoder output. `stride` >= width, `slice_height` >= height;
    /// the UV plane starts at `stride * slice_height`.
    pub fn wrap(
        width: u32,
        height: u32,
        stride: u32,
        slice_height: u32,
        data: Vec<u8>,
        release_callback: Option<ReleaseCallback>,
    ) -> Result<Self> {
        if width % 2 != 0 {
            return Err(NativeRtcError::UnsupportedFrameDimensions(width, height).into());
        }
        let needed = stride as usize * slice_height as usize
            + stride as usize * chroma_size(height) as usize;
        if stride < width || slice_height < height || data.len() < needed {
            return Err(NativeRtcError::BufferTooSmall(data.len(), needed).into());
        }
        Ok(Self {
            width,
            height,
            stride,
            slice_height,
            data: Arc::new(data),
            ref_count: Arc::new(RefCountDelegate::new(release_callback)),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn ref_count(&self) -> &Arc<RefCountDelegate> {
        &self.ref_count
    }

    pub fn to_i420(&self) -> I420Buffer {
        semiplanar_to_i420(
            self.width,
            self.height,
            self.stride,
            self.slice_height,
            &self.data,
            false,
        )
    }

    pub fn crop_and_scale(
        &self,
        crop_x: u32,
        crop_y: u32,
        crop_width: u32,
        crop_height: u32,
        scale_width: u32,
        scale_height: u32,
    ) -> Result<I420Buffer> {
        check_crop_region(
            self.width,
            self.height,
            crop_x,
            crop_y,
            crop_width,
            crop_height,
            scale_width,
            scale_height,
        )?;
        self.to_i420()
            .crop_and_scale(crop_x, crop_y, crop_width, crop_height, scale_width, scale_height)
    }
}

impl Nv21Buffer {
    /// Wraps camera output; NV21 is always tightly packed.
    pub fn wrap(
        width: u32,
        height: u32,
        data: Vec<u8>,
        release_callback: Option<ReleaseCallback>,
    ) -> Result<Self> {
        if width % 2 != 0 {
            return Err(NativeRtcError::UnsupportedFrameDimensions(width, height).into());
        }
        let needed = width as usize * height as usize
            + width as usize * chroma_size(height) as usize;
        if data.len() < needed {
            return Err(NativeRtcError::BufferTooSmall(data.len(), needed).into());
        }
        Ok(Self {
            width,
            height,
            data: Arc::new(data),
            ref_count: Arc::new(RefCountDelegate::new(release_callback)),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn ref_count(&self) -> &Arc<RefCountDelegate> {
        &self.ref_count
    }

    pub fn to_i420(&self) -> I420Buffer {
        semiplanar_to_i420(self.width, self.height, self.width, self.height, &self.data, true)
    }

    pub fn crop_and_scale(
        &self,
        crop_x: u32,
        crop_y: u32,
        crop_width: u32,
        crop_height: u32,
        scale_width: u32,
        scale_height: u32,
    ) -> Result<I420Buffer> {
        check_crop_region(
            self.width,
            self.height,
            crop_x,
            crop_y,
            crop_width,
            crop_height,
            scale_width,
            scale_height,
        )?;
        self.to_i420()
            .crop_and_scale(crop_x, crop_y, crop_width, crop_height, scale_width, scale_height)
    }
}

/// GL texture kind backing a [`TextureBuffer`].
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, num_enum::TryFromPrimitive)]
pub enum TextureType {
    Oes = 0,
    Rgb,
}

/// A frame that lives in a GPU texture. Pixel data stays on the GPU; crops
/// compose into the sampling transform instead of touching pixels.
pub struct TextureBuffer {
    texture_id: u32,
    texture_type: TextureType,
    width: u32,
    height: u32,
    // Row-major 3x3 applied to normalized texture coordinates.
    transform: [f32; 9],
    ref_count: Arc<RefCountDelegate>,
}

pub const IDENTITY_TRANSFORM: [f32; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

fn mat3_mul(a: &[f32; 9], b: &[f32; 9]) -> [f32; 9] {
    let mut out = [0.0; 9];
    for row in 0..3 {
        for col in 0..3 {
            out[row * 3 + col] = (0..3).map(|k| a[row * 3 + k] * b[k * 3 + col]).sum();
        }
    }
    out
}

impl TextureBuffer {
    pub fn new(
        texture_id: u32,
        texture_type: TextureType,
        width: u32,
        height: u32,
        transform: [f32; 9],
        release_callback: Option<ReleaseCallback>,
    ) -> Self {
        Self {
            texture_id,
            texture_type,
            width,
            height,
            transform,
            ref_count: Arc::new(RefCountDelegate::new(release_callback)),
        }
    }

    pub fn texture_id(&self) -> u32 {
        self.texture_id
    }

    pub fn texture_type(&self) -> TextureType {
        self.texture_type
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn transform(&self) -> &[f32; 9] {
        &self.transform
    }

    pub fn ref_count(&self) -> &Arc<RefCountDelegate> {
        &self.ref_count
    }

    /// Derives a cropped/scaled view of the same texture. The underlying
    /// texture is retained; releasing the derived buffer releases it again.
    pub fn crop_and_scale(
        &self,
        crop_x: u32,
        crop_y: u32,
        crop_width: u32,
        crop_height: u32,
        scale_width: u32,
        scale_height: u32,
    ) -> Result<TextureBuffer> {
        check_crop_region(
            self.width,
            self.height,
            crop_x,
            crop_y,
            crop_width,
            crop_height,
            scale_width,
            scale_height,
        )?;
        self.ref_count.retain()?;

        let crop = [
            crop_width as f32 / self.width as f32,
            0.0,
            crop_x as f32 / self.width as f32,
            0.0,
            crop_height as f32 / self.height as f32,
            crop_y as f32 / self.height as f32,
            0.0,
            0.0,
            1.0,
        ];
        let parent = self.ref_count.clone();
        Ok(TextureBuffer::new(
            self.texture_id,
            self.texture_type,
            scale_width,
            scale_height,
            mat3_mul(&self.transform, &crop),
            Some(Box::new(move || {
                if let Err(e) = parent.release() {
                    error!("releasing parent texture buffer: {}", e);
                }
            })),
        ))
    }

    /// Reads the texture back through the engine's YUV converter.
    pub fn to_i420(&self) -> Result<I420Buffer> {
        let rffi = webrtc::Arc::from_owned(unsafe {
            media::Rust_convertTextureToI420(
                self.texture_id,
                self.texture_type as i32,
                self.width,
                self.height,
                webrtc::ptr::Borrowed::from_ptr(self.transform.as_ptr()),
            )
        });
        if rffi.is_null() {
            return Err(NativeRtcError::NullPointer(
                "TextureBuffer::to_i420()".to_string(),
                "rffi".to_string(),
            )
            .into());
        }
        WrappedNativeBuffer::new(rffi, self.width, self.height).to_i420()
    }
}

/// An engine-owned frame buffer, shared through the native ref count.
#[derive(Clone, Debug)]
pub struct WrappedNativeBuffer {
    rffi: webrtc::Arc<media::RffiVideoFrameBuffer>,
    width: u32,
    height: u32,
}

impl WrappedNativeBuffer {
    pub fn new(rffi: webrtc::Arc<media::RffiVideoFrameBuffer>, width: u32, height: u32) -> Self {
        Self { rffi, width, height }
    }

    pub fn rffi(&self) -> &webrtc::Arc<media::RffiVideoFrameBuffer> {
        &self.rffi
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Copies the native buffer's pixels into a locally owned I420 buffer.
    pub fn to_i420(&self) -> Result<I420Buffer> {
        let size = self.width as usize * self.height as usize
            + 2 * chroma_size(self.width) as usize * chroma_size(self.height) as usize;
        let ptr = unsafe { media::Rust_getVideoFrameBufferAsI420(self.rffi.as_borrowed()) };
        if ptr.is_null() {
            return Err(NativeRtcError::NullPointer(
                "WrappedNativeBuffer::to_i420()".to_string(),
                "i420_data".to_string(),
            )
            .into());
        }
        let data = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), size) }.to_vec();
        I420Buffer::wrap(self.width, self.height, data, None)
    }

    pub fn crop_and_scale(
        &self,
        crop_x: u32,
        crop_y: u32,
        crop_width: u32,
        crop_height: u32,
        scale_width: u32,
        scale_height: u32,
    ) -> Result<WrappedNativeBuffer> {
        check_crop_region(
            self.width,
            self.height,
            crop_x,
            crop_y,
            crop_width,
            crop_height,
            scale_width,
            scale_height,
        )?;
        let rffi = webrtc::Arc::from_owned(unsafe {
            media::Rust_cropAndScaleVideoFrameBuffer(
                self.rffi.as_borrowed(),
                crop_x,
                crop_y,
                crop_width,
                crop_height,
                scale_width,
                scale_height,
            )
        });
        if rffi.is_null() {
            return Err(NativeRtcError::NullPointer(
                "WrappedNativeBuffer::crop_and_scale()".to_string(),
                "rffi".to_string(),
            )
            .into());
        }
        Ok(WrappedNativeBuffer::new(rffi, scale_width, scale_height))
    }
}

/// The buffer variants, dispatched as a tagged union rather than a trait
/// hierarchy.
pub enum FrameBuffer {
    I420(I420Buffer),
    Nv12(Nv12Buffer),
    Nv21(Nv21Buffer),
    Texture(TextureBuffer),
    WrappedNative(WrappedNativeBuffer),
}

impl FrameBuffer {
    pub fn width(&self) -> u32 {
        match self {
            FrameBuffer::I420(b) => b.width(),
            FrameBuffer::Nv12(b) => b.width(),
            FrameBuffer::Nv21(b) => b.width(),
            FrameBuffer::Texture(b) => b.width(),
            FrameBuffer::WrappedNative(b) => b.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            FrameBuffer::I420(b) => b.height(),
            FrameBuffer::Nv12(b) => b.height(),
            FrameBuffer::Nv21(b) => b.height(),
            FrameBuffer::Texture(b) => b.height(),
            FrameBuffer::WrappedNative(b) => b.height(),
        }
    }

    pub fn to_i420(&self) -> Result<I420Buffer> {
        match self {
            FrameBuffer::I420(b) => {
                b.crop_and_scale(0, 0, b.width(), b.height(), b.width(), b.height())
            }
            FrameBuffer::Nv12(b) => Ok(b.to_i420()),
            FrameBuffer::Nv21(b) => Ok(b.to_i420()),
            FrameBuffer::Texture(b) => b.to_i420(),
            FrameBuffer::WrappedNative(b) => b.to_i420(),
        }
    }

    pub fn crop_and_scale(
        &self,
        crop_x: u32,
        crop_y: u32,
        crop_width: u32,
        crop_height: u32,
        scale_width: u32,
        scale_height: u32,
    ) -> Result<FrameBuffer> {
        match self {
            FrameBuffer::I420(b) => Ok(FrameBuffer::I420(b.crop_and_scale(
                crop_x,
                crop_y,
                crop_width,
                crop_height,
                scale_width,
                scale_height,
            )?)),
            FrameBuffer::Nv12(b) => Ok(FrameBuffer::I420(b.crop_and_scale(
                crop_x,
                crop_y,
                crop_width,
                crop_height,
                scale_width,
                scale_height,
            )?)),
            FrameBuffer::Nv21(b) => Ok(FrameBuffer::I420(b.crop_and_scale(
                crop_x,
                crop_y,
                crop_width,
                crop_height,
                scale_width,
                scale_height,
            )?)),
            FrameBuffer::Texture(b) => Ok(FrameBuffer::Texture(b.crop_and_scale(
                crop_x,
                crop_y,
                crop_width,
                crop_height,
                scale_width,
                scale_height,
            )?)),
            FrameBuffer::WrappedNative(b) => Ok(FrameBuffer::WrappedNative(b.crop_and_scale(
                crop_x,
                crop_y,
                crop_width,
                crop_height,
                scale_width,
                scale_height,
            )?)),
        }
    }

    /// Forwards to the local ref count. Native buffers are managed by the
    /// engine's count through `webrtc::Arc` and always succeed here.
    pub fn retain(&self) -> Result<()> {
        match self.ref_count() {
            Some(ref_count) => ref_count.retain(),
            None => Ok(()),
        }
    }

    pub fn release(&self) -> Result<()> {
        match self.ref_count() {
            Some(ref_count) => ref_count.release(),
            None => Ok(()),
        }
    }

    pub fn safe_retain(&self) -> bool {
        match self.ref_count() {
            Some(ref_count) => ref_count.safe_retain(),
            None => true,
        }
    }

    fn ref_count(&self) -> Option<&Arc<RefCountDelegate>> {
        match self {
            FrameBuffer::I420(b) => Some(b.ref_count()),
            FrameBuffer::Nv12(b) => Some(b.ref_count()),
            FrameBuffer::Nv21(b) => Some(b.ref_count()),
            FrameBuffer::Texture(b) => Some(b.ref_count()),
            FrameBuffer::WrappedNative(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    // A 4x4 I420 buffer with distinct plane fill values.
    fn test_i420() -> I420Buffer {
        let mut data = vec![0u8; 4 * 4 + 2 * 2 * 2];
        for (i, byte) in data[..16].iter_mut().enumerate() {
            *byte = i as u8;
        }
        data[16..20].copy_from_slice(&[101, 102, 103, 104]);
        data[20..24].copy_from_slice(&[201, 202, 203, 204]);
        I420Buffer::wrap(4, 4, data, None).unwrap()
    }

    #[test]
    fn i420_plane_accessors() {
        let buffer = test_i420();
        assert_eq!(16, buffer.data_y().len());
        assert_eq!(&[101, 102, 103, 104], buffer.data_u());
        assert_eq!(&[201, 202, 203, 204], buffer.data_v());
    }

    #[test]
    fn i420_identity_crop_copies() {
        let buffer = test_i420();
        let copy = buffer.crop_and_scale(0, 0, 4, 4, 4, 4).unwrap();
        assert_eq!(buffer.data_y(), copy.data_y());
        assert_eq!(buffer.data_u(), copy.data_u());
        assert_eq!(buffer.data_v(), copy.data_v());
        // New ownership: the copy has its own count at 1.
        assert_eq!(1, copy.ref_count().count());
        assert_eq!(1, buffer.ref_count().count());
    }

    #[test]
    fn i420_crop_quadrant() {
        let buffer = test_i420();
        let cropped = buffer.crop_and_scale(2, 2, 2, 2, 2, 2).unwrap();
        // Bottom-right 2x2 of the Y plane.
        assert_eq!(&[10, 11, 14, 15], cropped.data_y());
        assert_eq!(&[104], cropped.data_u());
        assert_eq!(&[204], cropped.data_v());
    }

    #[test]
    fn i420_scale_down() {
        let buffer = test_i420();
        let scaled = buffer.crop_and_scale(0, 0, 4, 4, 2, 2).unwrap();
        assert_eq!(2, scaled.width());
        assert_eq!(2, scaled.height());
        // Nearest-neighbor picks the top-left sample of each 2x2 block.
        assert_eq!(&[0, 2, 8, 10], scaled.data_y());
    }

    #[test]
    fn i420_rejects_out_of_bounds_crop() {
        let buffer = test_i420();
        assert!(buffer.crop_and_scale(2, 2, 4, 4, 2, 2).is_err());
        assert!(buffer.crop_and_scale(0, 0, 0, 4, 2, 2).is_err());
        assert!(buffer.crop_and_scale(0, 0, 4, 4, 0, 2).is_err());
    }

    #[test]
    fn i420_rotation() {
        let buffer = test_i420();
        let rotated = buffer.rotate(Rotation::Clockwise90);
        assert_eq!(4, rotated.width());
        assert_eq!(4, rotated.height());
        // Top row of the rotated Y plane is the first column bottom-up.
        assert_eq!(&[12, 8, 4, 0], &rotated.data_y()[..4]);

        let back = rotated.rotate(Rotation::Clockwise270);
        assert_eq!(buffer.data_y(), back.data_y());
        assert_eq!(buffer.data_u(), back.data_u());

        let flipped = buffer.rotate(Rotation::Clockwise180);
        assert_eq!(&[15, 14, 13, 12], &flipped.data_y()[..4]);
    }

    #[test]
    fn nv12_to_i420_deinterleaves_chroma() {
        // 2x2 frame: 4 luma bytes, one interleaved UV pair.
        let data = vec![1, 2, 3, 4, 50, 60];
        let buffer = Nv12Buffer::wrap(2, 2, 2, 2, data, None).unwrap();
        let i420 = buffer.to_i420();
        assert_eq!(&[1, 2, 3, 4], i420.data_y());
        assert_eq!(&[50], i420.data_u());
        assert_eq!(&[60], i420.data_v());
    }

    #[test]
    fn nv12_respects_stride_and_slice_height() {
        // 2x2 frame padded to stride 4, slice height 3.
        let mut data = vec![0u8; 4 * 3 + 4];
        data[0] = 1;
        data[1] = 2;
        data[4] = 3;
        data[5] = 4;
        data[12] = 50;
        data[13] = 60;
        let buffer = Nv12Buffer::wrap(2, 2, 4, 3, data, None).unwrap();
        let i420 = buffer.to_i420();
        assert_eq!(&[1, 2, 3, 4], i420.data_y());
        assert_eq!(&[50], i420.data_u());
        assert_eq!(&[60], i420.data_v());
    }

    #[test]
    fn nv21_swaps_chroma_order() {
        let data = vec![1, 2, 3, 4, 50, 60];
        let buffer = Nv21Buffer::wrap(2, 2, data, None).unwrap();
        let i420 = buffer.to_i420();
        assert_eq!(&[60], i420.data_u());
        assert_eq!(&[50], i420.data_v());
    }

    #[test]
    fn wrap_rejects_short_buffers() {
        assert!(I420Buffer::wrap(4, 4, vec![0; 10], None).is_err());
        assert!(Nv12Buffer::wrap(2, 2, 2, 2, vec![0; 4], None).is_err());
        assert!(Nv21Buffer::wrap(2, 2, vec![0; 5], None).is_err());
    }

    #[test]
    fn texture_crop_retains_parent() {
        let releases = std::sync::Arc::new(AtomicU32::new(0));
        let releases_in_callback = releases.clone();
        let texture = TextureBuffer::new(
            7,
            TextureType::Oes,
            640,
            480,
            IDENTITY_TRANSFORM,
            Some(Box::new(move || {
                releases_in_callback.fetch_add(1, Ordering::SeqCst);
            })),
        );

        let derived = texture.crop_and_scale(0, 0, 320, 240, 320, 240).unwrap();
        assert_eq!(7, derived.texture_id());
        assert_eq!(2, texture.ref_count().count());

        // Dropping the derived buffer's reference releases the parent once.
        derived.ref_count().release().unwrap();
        assert_eq!(1, texture.ref_count().count());
        assert_eq!(0, releases.load(Ordering::SeqCst));

        texture.ref_count().release().unwrap();
        assert_eq!(1, releases.load(Ordering::SeqCst));
    }

    #[test]
    fn texture_crop_composes_transform() {
        let texture =
            TextureBuffer::new(7, TextureType::Rgb, 640, 480, IDENTITY_TRANSFORM, None);
        let derived = texture.crop_and_scale(320, 240, 320, 240, 160, 120).unwrap();
        let t = derived.transform();
        // x' = 0.5x + 0.5, y' = 0.5y + 0.5
        assert_eq!(0.5, t[0]);
        assert_eq!(0.5, t[2]);
        assert_eq!(0.5, t[4]);
        assert_eq!(0.5, t[5]);
        assert_eq!(160, derived.width());
        assert_eq!(120, derived.height());
    }
}
