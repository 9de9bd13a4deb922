//! Domain-critical regression tests for f3kdb-core.
//!
//! These tests exercise the public [`Core`](crate::Core) contract end to
//! end. Each test documents the regression it guards against.

#[cfg(test)]
mod domain_tests {
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::{
        detect, Core, CpuTier, DitherAlgorithm, OptimizationMode, Params, PixelMode, Plane,
        VideoInfo,
    };

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Noisy horizontal ramp at `depth` bits, one sample per pixel.
    fn ramp_samples(width: usize, height: usize, depth: u8, seed: u64) -> Vec<u16> {
        let mut rng = StdRng::seed_from_u64(seed);
        let max = (1i32 << depth) - 1;
        let noise = 1i32 << (depth - 7);
        (0..height)
            .flat_map(|_| (0..width).map(|x| (x as i32 * max) / width as i32))
            .map(|v| (v + rng.gen_range(-noise..=noise)).clamp(0, max) as u16)
            .collect::<Vec<_>>()
    }

    /// Lay samples out in `mode` with `pitch` bytes per row, padding
    /// filled with `0xA5` so copies that touch padding are caught.
    fn encode(
        samples: &[u16],
        width: usize,
        height: usize,
        pitch: usize,
        mode: PixelMode,
    ) -> Vec<u8> {
        let rows = height * mode.rows_per_row();
        let mut data = vec![0xA5u8; pitch * rows];
        for y in 0..height {
            for x in 0..width {
                let value = samples[y * width + x];
                match mode {
                    PixelMode::LowBitDepth => data[y * pitch + x] = value as u8,
                    PixelMode::HighBitDepthStacked => {
                        data[y * pitch + x] = (value >> 8) as u8;
                        data[(height + y) * pitch + x] = value as u8;
                    }
                    PixelMode::HighBitDepthInterleaved => {
                        let pos = y * pitch + x * 2;
                        data[pos..pos + 2].copy_from_slice(&value.to_le_bytes());
                    }
                }
            }
        }
        data
    }

    fn buffer_len(height: usize, pitch: usize, mode: PixelMode) -> usize {
        pitch * height * mode.rows_per_row()
    }

    /// Process every plane of one frame, returning the three output buffers.
    fn process_frame(
        core: &Core,
        frame_index: usize,
        planes: &[Vec<u8>; 3],
        src_pitches: [usize; 3],
        dst_pitches: [usize; 3],
    ) -> [Vec<u8>; 3] {
        let vi = core.video_info();
        let mut out: [Vec<u8>; 3] = Default::default();
        for plane in Plane::ALL {
            let i = plane.index();
            let len = buffer_len(vi.plane_height(plane), dst_pitches[i], core.output_mode());
            let mut dst = vec![0x5Au8; len];
            core.process_plane(
                frame_index,
                plane,
                &mut dst,
                dst_pitches[i],
                &planes[i],
                src_pitches[i],
            )
            .unwrap();
            out[i] = dst;
        }
        out
    }

    fn ramp_frame(vi: &VideoInfo, pitches: [usize; 3], seed: u64) -> [Vec<u8>; 3] {
        let mut planes: [Vec<u8>; 3] = Default::default();
        for plane in Plane::ALL {
            let (w, h) = (vi.plane_width(plane), vi.plane_height(plane));
            let samples = ramp_samples(w, h, vi.depth, seed + plane.index() as u64);
            planes[plane.index()] = encode(&samples, w, h, pitches[plane.index()], vi.pixel_mode);
        }
        planes
    }

    fn tight_pitches(vi: &VideoInfo, mode: PixelMode, pad: usize) -> [usize; 3] {
        Plane::ALL.map(|p| vi.plane_width(p) * mode.bytes_per_sample() + pad)
    }

    fn available_tiers() -> Vec<(CpuTier, OptimizationMode)> {
        [
            (CpuTier::Scalar, OptimizationMode::Scalar),
            (CpuTier::Sse2, OptimizationMode::Sse2),
            (CpuTier::Ssse3, OptimizationMode::Ssse3),
            (CpuTier::Sse41, OptimizationMode::Sse41),
        ]
        .into_iter()
        .filter(|(tier, _)| *tier <= detect())
        .collect()
    }

    // ========================================================================
    // GAP 1: Reference scenario -- flat input must survive untouched
    // ========================================================================

    /// If this breaks, it means: averaging of identical samples no longer
    /// returns the sample (e.g. the avg4 bias was applied to both pairs or
    /// dropped rounding), or 8-bit upsampling/downsampling is not symmetric.
    #[test]
    fn test_flat_mid_grey_frame_is_preserved() {
        let vi = VideoInfo::new(64, 64, 1);
        let params = Params::default()
            .range(15)
            .thresholds(64, 64, 64)
            .grain(0, 0)
            .sample_mode(2)
            .blur_first(true)
            .seed(0);
        let core = Core::new(&vi, &params).unwrap();

        let src = vec![128u8; 64 * 64];
        let mut dst = vec![0u8; 64 * 64];
        core.process_plane(0, Plane::Y, &mut dst, 64, &src, 64).unwrap();
        assert!(
            dst.iter().all(|&p| p == 128),
            "REGRESSION: flat 128 plane changed after debanding"
        );
    }

    // ========================================================================
    // GAP 2: Determinism across instances and request order
    // ========================================================================

    /// If this breaks, it means: dynamic grain offsets are being drawn lazily
    /// (so they depend on which frames were requested before), or table
    /// construction consumes randomness in a non-deterministic order.
    #[test]
    fn test_dynamic_grain_independent_of_request_order() {
        let vi = VideoInfo::new(48, 32, 6);
        let params = Params::default().dynamic_grain(true).seed(7);
        let pitches = tight_pitches(&vi, vi.pixel_mode, 0);
        let frame = ramp_frame(&vi, pitches, 11);

        let forward = Core::new(&vi, &params).unwrap();
        let shuffled = Core::new(&vi, &params).unwrap();

        let in_order: Vec<_> = (0..6)
            .map(|f| process_frame(&forward, f, &frame, pitches, pitches))
            .collect();
        for f in [4, 1, 5, 0, 3, 2] {
            let out = process_frame(&shuffled, f, &frame, pitches, pitches);
            assert_eq!(out, in_order[f], "frame {f} differs when requested out of order");
        }

        // frame indices wrap on the frame count
        assert_eq!(process_frame(&forward, 8, &frame, pitches, pitches), in_order[2]);
        // and different frames really do get different grain
        assert!(in_order[0] != in_order[1]);
    }

    /// If this breaks, it means: the user seed is not mixed into the LUT
    /// seed, so every clip gets the same noise pattern.
    #[test]
    fn test_seed_changes_output() {
        let vi = VideoInfo::new(32, 32, 1);
        let pitches = tight_pitches(&vi, vi.pixel_mode, 0);
        let frame = ramp_frame(&vi, pitches, 3);
        let a = Core::new(&vi, &Params::default().seed(1)).unwrap();
        let b = Core::new(&vi, &Params::default().seed(2)).unwrap();
        assert!(
            process_frame(&a, 0, &frame, pitches, pitches)
                != process_frame(&b, 0, &frame, pitches, pitches)
        );
    }

    // ========================================================================
    // GAP 3: Cross-backend equivalence
    // ========================================================================

    /// If this breaks, it means: a vector tier computes reference positions,
    /// the avg4 bias, the threshold test or the dither order differently
    /// from the scalar backend. Covers every sample mode, blur mode, dither
    /// algorithm and output layout, with padded pitches and a source that
    /// does not start at the beginning of its allocation.
    #[test]
    fn test_all_tiers_match_scalar() {
        let outputs = [
            (PixelMode::LowBitDepth, 8),
            (PixelMode::HighBitDepthStacked, 10),
            (PixelMode::HighBitDepthInterleaved, 12),
            (PixelMode::HighBitDepthStacked, 16),
            (PixelMode::HighBitDepthInterleaved, 16),
        ];
        let inputs = [
            VideoInfo::new(37, 21, 2),
            VideoInfo::new(40, 24, 2)
                .subsampling(1, 0)
                .format(PixelMode::HighBitDepthInterleaved, 10),
        ];
        let dithers = [
            DitherAlgorithm::NoDithering,
            DitherAlgorithm::Ordered,
            DitherAlgorithm::FloydSteinberg,
        ];

        for vi in inputs {
            let src_pitches = tight_pitches(&vi, vi.pixel_mode, 3);
            let frame = ramp_frame(&vi, src_pitches, 21);
            // shift every source one byte into its allocation
            let shifted: [Vec<u8>; 3] = frame.clone().map(|plane| {
                let mut buffer = vec![0u8; plane.len() + 1];
                buffer[1..].copy_from_slice(&plane);
                buffer
            });

            for (out_mode, out_depth) in outputs {
                let dst_pitches = tight_pitches(&vi, out_mode, 5);
                for dither in dithers {
                    for sample_mode in [1, 2] {
                        for blur_first in [true, false] {
                            let params = Params::default()
                                .range(20)
                                .thresholds(40, 30, 30)
                                .grain(32, 24)
                                .dynamic_grain(true)
                                .sample_mode(sample_mode)
                                .blur_first(blur_first)
                                .dither_algo(dither)
                                .output(out_mode, out_depth);

                            let mut reference = None;
                            for (tier, opt) in available_tiers() {
                                let core = Core::new(&vi, &params.clone().opt(opt)).unwrap();
                                assert_eq!(core.cpu_tier(), tier);
                                let mut outs = Vec::new();
                                for plane in Plane::ALL {
                                    let i = plane.index();
                                    let len = buffer_len(
                                        vi.plane_height(plane),
                                        dst_pitches[i],
                                        out_mode,
                                    );
                                    let mut dst = vec![0u8; len];
                                    core.process_plane(
                                        1,
                                        plane,
                                        &mut dst,
                                        dst_pitches[i],
                                        &shifted[i][1..],
                                        src_pitches[i],
                                    )
                                    .unwrap();
                                    outs.push(dst);
                                }
                                match &reference {
                                    None => reference = Some(outs),
                                    Some(expected) => assert_eq!(
                                        &outs, expected,
                                        "{tier} differs from scalar: {vi:?} {params:?}"
                                    ),
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    // ========================================================================
    // GAP 4: Threshold gating on flat planes
    // ========================================================================

    /// If this breaks, it means: some combination of threshold, sample mode
    /// or dither algorithm alters flat areas without grain, e.g. ordered
    /// dither thresholds are not scaled to the output depth or the
    /// Floyd-Steinberg buffer is not cleared between calls.
    #[test]
    fn test_flat_plane_unchanged_for_any_threshold() {
        for (mode, depth, value) in [
            (PixelMode::LowBitDepth, 8u8, 77u16),
            (PixelMode::HighBitDepthStacked, 10, 612),
            (PixelMode::HighBitDepthInterleaved, 14, 9000),
        ] {
            let vi = VideoInfo::new(32, 32, 1).format(mode, depth);
            for threshold in [0u16, 1, 64, 511] {
                for dither in [
                    DitherAlgorithm::NoDithering,
                    DitherAlgorithm::Ordered,
                    DitherAlgorithm::FloydSteinberg,
                ] {
                    for sample_mode in [1, 2] {
                        let params = Params::default()
                            .threshold(threshold)
                            .grain(0, 0)
                            .sample_mode(sample_mode)
                            .dither_algo(dither);
                        let core = Core::new(&vi, &params).unwrap();
                        let pitch = 32 * mode.bytes_per_sample();
                        let src = encode(&vec![value; 32 * 32], 32, 32, pitch, mode);
                        let mut dst = vec![0u8; src.len()];
                        for frame in 0..2 {
                            core.process_plane(frame, Plane::Y, &mut dst, pitch, &src, pitch)
                                .unwrap();
                            let case = format!("{mode:?}/{depth} threshold {threshold}");
                            assert_eq!(
                                dst, src,
                                "flat plane changed: {case} {dither:?} mode {sample_mode}"
                            );
                        }
                    }
                }
            }
        }
    }

    // ========================================================================
    // GAP 5: Range safety at the minimum frame size
    // ========================================================================

    /// If this breaks, it means: reference distances are not clamped to the
    /// plane borders (luma), or subsampled chroma offsets escape a chroma
    /// plane whose size is not an exact multiple of the subsampling factor.
    /// An escape shows up as an index panic.
    #[test]
    fn test_max_range_on_small_frames_stays_in_bounds() {
        let geometries = [
            VideoInfo::new(16, 16, 1),
            VideoInfo::new(16, 16, 1).subsampling(0, 0),
            VideoInfo::new(16, 16, 1).subsampling(1, 0),
            VideoInfo::new(16, 16, 1).subsampling(2, 2),
            VideoInfo::new(16, 16, 1).subsampling(4, 4),
            VideoInfo::new(17, 19, 1),
            VideoInfo::new(23, 17, 1).subsampling(2, 1),
        ];
        for vi in geometries {
            for sample_mode in [1, 2] {
                for blur_first in [true, false] {
                    let params = Params::default()
                        .range(31)
                        .threshold(511)
                        .sample_mode(sample_mode)
                        .blur_first(blur_first);
                    let core = Core::new(&vi, &params).unwrap();
                    // exact-fit buffers so any overrun panics
                    let pitches = tight_pitches(&vi, vi.pixel_mode, 0);
                    let frame = ramp_frame(&vi, pitches, 5);
                    let out = process_frame(&core, 0, &frame, pitches, pitches);
                    for plane in Plane::ALL {
                        assert_eq!(
                            out[plane.index()].len(),
                            vi.plane_width(plane) * vi.plane_height(plane)
                        );
                    }
                }
            }
        }
    }

    // ========================================================================
    // GAP 6: Fast-path copy
    // ========================================================================

    /// If this breaks, it means: the no-op configuration stopped taking the
    /// copy path, or the copy writes into destination padding / copies
    /// source padding.
    #[test]
    fn test_no_op_configuration_copies_bytes() {
        let params = Params::default().threshold(0).grain(0, 0);
        for (mode, depth) in [
            (PixelMode::LowBitDepth, 8u8),
            (PixelMode::HighBitDepthStacked, 12),
            (PixelMode::HighBitDepthInterleaved, 16),
        ] {
            let vi = VideoInfo::new(40, 18, 1).format(mode, depth);
            let core = Core::new(&vi, &params).unwrap();
            let samples = ramp_samples(40, 18, depth, 9);
            let row_bytes = 40 * mode.bytes_per_sample();

            // same pitch everywhere: one block copy
            let src = encode(&samples, 40, 18, row_bytes, mode);
            let mut dst = vec![0u8; src.len()];
            core.process_plane(0, Plane::Y, &mut dst, row_bytes, &src, row_bytes)
                .unwrap();
            assert_eq!(dst, src);

            // different pitches: row by row, padding untouched
            let src = encode(&samples, 40, 18, row_bytes + 8, mode);
            let dst_pitch = row_bytes + 24;
            let rows = 18 * mode.rows_per_row();
            let mut dst = vec![0x11u8; dst_pitch * rows];
            core.process_plane(0, Plane::Y, &mut dst, dst_pitch, &src, row_bytes + 8)
                .unwrap();
            for row in 0..rows {
                let src_row = &src[row * (row_bytes + 8)..][..row_bytes];
                let dst_row = &dst[row * dst_pitch..][..dst_pitch];
                assert_eq!(&dst_row[..row_bytes], src_row);
                assert!(dst_row[row_bytes..].iter().all(|&b| b == 0x11));
            }
        }
    }

    // ========================================================================
    // GAP 7: Output range policy
    // ========================================================================

    /// If this breaks, it means: TV range clamping uses the wrong bounds or
    /// the chroma bound (240) is applied to luma (235) or vice versa.
    #[test]
    fn test_keep_tv_range_clamps_per_plane() {
        let vi = VideoInfo::new(16, 16, 1).subsampling(0, 0);
        let params = Params::default().grain(0, 0).keep_tv_range(true);
        let core = Core::new(&vi, &params).unwrap();
        for (value, luma, chroma) in [(0u8, 16u8, 16u8), (255, 235, 240), (100, 100, 100)] {
            let src = vec![value; 256];
            let mut dst = vec![0u8; 256];
            core.process_plane(0, Plane::Y, &mut dst, 16, &src, 16).unwrap();
            assert!(dst.iter().all(|&p| p == luma), "luma {value} -> {:?}", &dst[..4]);
            core.process_plane(0, Plane::Cr, &mut dst, 16, &src, 16).unwrap();
            assert!(dst.iter().all(|&p| p == chroma), "chroma {value} -> {:?}", &dst[..4]);
        }
    }

    // ========================================================================
    // GAP 8: Cached per-plane state
    // ========================================================================

    /// If this breaks, it means: a cached dither context or reference
    /// offset stream built for one source pitch is reused for another.
    #[test]
    fn test_pitch_change_matches_fresh_core() {
        let vi = VideoInfo::new(40, 24, 1);
        let params = Params::default().dither_algo(DitherAlgorithm::FloydSteinberg);
        let warm = Core::new(&vi, &params).unwrap();
        let fresh = Core::new(&vi, &params).unwrap();

        let narrow = tight_pitches(&vi, vi.pixel_mode, 0);
        let wide = tight_pitches(&vi, vi.pixel_mode, 24);
        let _ = process_frame(&warm, 0, &ramp_frame(&vi, narrow, 1), narrow, narrow);

        let frame = ramp_frame(&vi, wide, 2);
        assert_eq!(
            process_frame(&warm, 0, &frame, wide, narrow),
            process_frame(&fresh, 0, &frame, wide, narrow)
        );
    }

    /// If this breaks, it means: planes of one frame share mutable state, so
    /// processing them on different threads (luma on the caller, chroma on a
    /// worker) gives different results from sequential processing.
    #[test]
    fn test_concurrent_planes_match_sequential() {
        let vi = VideoInfo::new(64, 32, 3);
        let params = Params::default().dynamic_grain(true);
        let core = Core::new(&vi, &params).unwrap();
        let pitches = tight_pitches(&vi, vi.pixel_mode, 0);
        let frame = ramp_frame(&vi, pitches, 8);
        let sequential = process_frame(&core, 2, &frame, pitches, pitches);

        let mut outputs: [Vec<u8>; 3] = Plane::ALL.map(|p| {
            vec![0u8; vi.plane_width(p) * vi.plane_height(p)]
        });
        std::thread::scope(|scope| {
            for (plane, dst) in Plane::ALL.into_iter().zip(outputs.iter_mut()) {
                let core = &core;
                let src = &frame[plane.index()];
                let pitch = pitches[plane.index()];
                scope.spawn(move || {
                    core.process_plane(2, plane, dst, pitch, src, pitch).unwrap();
                });
            }
        });
        assert_eq!(outputs, sequential);
    }
}
