//! Reference backend: one pixel at a time, offsets computed from the LUT.

use super::{deband_pixel, reference_offsets, ProcessPlaneParams};
use crate::codec::downsample;
use crate::dither::DitherKernel;

pub(crate) fn process_plane_scalar<const SAMPLE_MODE: u8, const BLUR_FIRST: bool, D: DitherKernel>(
    params: ProcessPlaneParams<'_>,
) {
    let ProcessPlaneParams {
        src,
        mut dst,
        width,
        height,
        width_subsampling,
        height_subsampling,
        lut,
        grain,
        threshold,
        range,
        output_depth,
        context,
        ref_stream: _,
    } = params;

    let mut kernel = D::begin(context, width, output_depth);
    let src_step = src.step();
    let dst_step = dst.step();
    let pitch = src.pitch() as isize;
    let grain_stride = lut.stride();

    for row in 0..height {
        let src_row = row * src.pitch();
        let dst_row = row * dst.pitch();
        let grain_row = &grain[row * grain_stride..row * grain_stride + width];

        for (column, (&info, &change)) in lut.row(row).iter().zip(grain_row).enumerate() {
            let offsets = reference_offsets(
                info,
                SAMPLE_MODE,
                pitch,
                src_step as isize,
                width_subsampling,
                height_subsampling,
            );
            let pixel = deband_pixel::<SAMPLE_MODE, BLUR_FIRST>(
                &src,
                src_row + column * src_step,
                offsets,
                threshold,
                change,
            );
            let pixel = kernel.dither(pixel, row, column);
            dst.write(
                dst_row + column * dst_step,
                downsample(pixel, range, output_depth),
            );
        }
        kernel.next_row();
    }

    kernel.finish(context);
}
