use image::{imageops, GrayImage};

pub fn decode(img: &GrayImage) -> String {
    let (w, h) = img.dimensions();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w as usize, h as usize, |x, y| {
        img.get_pixel(x as u32, y as u32).0[0]
    });
    // Dense symbols can yield spurious extra grids, the real one is the one that decodes
    let grids = prepared.detect_grids();
    assert!(!grids.is_empty(), "No symbol found");
    let (_meta, content) =
        grids.iter().find_map(|g| g.decode().ok()).expect("Failed to read QR");
    content
}

pub fn upscale(img: &GrayImage, factor: u32) -> GrayImage {
    let (w, h) = img.dimensions();
    imageops::resize(img, w * factor, h * factor, imageops::FilterType::Nearest)
}

#[cfg(test)]
mod qr_proptests {
    use prop::string::string_regex;
    use proptest::prelude::*;

    use qrgenerator::*;

    use super::decode;

    pub fn ec_level_strategy() -> BoxedStrategy<ECLevel> {
        prop_oneof![Just(ECLevel::L), Just(ECLevel::M), Just(ECLevel::Q), Just(ECLevel::H)].boxed()
    }

    pub fn scale_mode_strategy() -> BoxedStrategy<ScaleMode> {
        prop_oneof![Just(ScaleMode::Fit), Just(ScaleMode::Stretch)].boxed()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn proptest_exact_dimensions(
            data in string_regex(r"[ -~]{0,300}").unwrap(),
            width in 1u32..600,
            height in 1u32..600,
            mode in scale_mode_strategy(),
        ) {
            let bitmap = Generator::new().scale_mode(mode).generate(&data, width, height).unwrap();
            prop_assert_eq!((bitmap.width(), bitmap.height()), (width, height));
            prop_assert_eq!(bitmap.as_raw().len(), (width * height) as usize);
            prop_assert!(bitmap.as_raw().iter().all(|&p| p == 0 || p == 255));
        }

        #[test]
        fn proptest_deterministic(
            data in string_regex(r"[0-9A-Za-z $%*+\-./:]{0,200}").unwrap(),
            side in 30u32..400,
            ecl in ec_level_strategy(),
        ) {
            let gen = Generator::new().ec_level(ecl).clone();
            let first = gen.generate(&data, side, side).unwrap();
            let second = gen.generate(&data, side, side).unwrap();
            prop_assert_eq!(first, second);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn proptest_round_trip(
            data in string_regex(r"[0-9A-Za-z $%*+\-./:]{1,100}").unwrap(),
            ecl in ec_level_strategy(),
        ) {
            let bitmap = Generator::new().ec_level(ecl).generate(&data, 600, 600).unwrap();
            prop_assert_eq!(decode(bitmap.as_image()), data);
        }
    }
}

#[cfg(test)]
mod qr_tests {
    use std::error::Error;

    use rayon::prelude::*;
    use test_case::test_case;

    use qrgenerator::{generate, ErrorKind, Generator, QRError, ScaleMode};

    use super::{decode, upscale};

    #[test]
    fn test_hello_256() {
        let bitmap = generate("HELLO", 256, 256).unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (256, 256));
        assert_eq!(decode(bitmap.as_image()), "HELLO");
    }

    #[test]
    fn test_idempotent() {
        let first = generate("https://example.com/?q=qr", 300, 300).unwrap();
        let second = generate("https://example.com/?q=qr", 300, 300).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test_case(0, 0)]
    #[test_case(0, 64)]
    #[test_case(64, 0)]
    fn test_invalid_size(width: u32, height: u32) {
        let err = generate("HELLO", width, height).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSize);
    }

    #[test]
    fn test_too_long() {
        let err = generate(&"a".repeat(10_000), 256, 256).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
        let source = err.source().and_then(|e| e.downcast_ref::<QRError>());
        assert_eq!(source, Some(&QRError::DataTooLong));
    }

    #[test]
    fn test_byte_capacity_boundary() {
        assert!(generate(&"a".repeat(2953), 200, 200).is_ok());
        let err = generate(&"a".repeat(2954), 200, 200).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }

    // Empty text is accepted and produces a symbol with an empty payload
    #[test]
    fn test_empty_text() {
        let bitmap = generate("", 64, 64).unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (64, 64));
        assert_eq!(decode(&upscale(bitmap.as_image(), 4)), "");
    }

    #[test]
    fn test_scaling_preserves_content() {
        // Version 1 with a 4 module quiet zone spans 29 modules, one pixel each
        let small = generate("A", 29, 29).unwrap();
        let large = generate("A", 290, 290).unwrap();

        for y in 0..290 {
            for x in 0..290 {
                assert_eq!(large.is_dark(x, y), small.is_dark(x / 10, y / 10), "Pixel ({x}, {y})");
            }
        }
        assert_eq!(decode(large.as_image()), "A");
        assert_eq!(decode(&upscale(small.as_image(), 10)), "A");
    }

    #[test]
    fn test_fit_centres_on_wide_canvas() {
        let square = generate("HELLO", 290, 290).unwrap();
        let wide = generate("HELLO", 500, 290).unwrap();
        for y in 0..290 {
            for x in 0..105 {
                assert!(!wide.is_dark(x, y));
                assert!(!wide.is_dark(x + 395, y));
            }
            for x in 0..290 {
                assert_eq!(wide.is_dark(x + 105, y), square.is_dark(x, y));
            }
        }
        assert_eq!(decode(wide.as_image()), "HELLO");
    }

    #[test]
    fn test_stretch_fills_canvas() {
        let bitmap =
            Generator::new().scale_mode(ScaleMode::Stretch).generate("HELLO", 580, 290).unwrap();
        // 20 pixels per module horizontally, 10 vertically, top left finder at module 4
        assert!(!bitmap.is_dark(79, 40));
        assert!(bitmap.is_dark(80, 40));
        assert!(bitmap.is_dark(80 + 7 * 20 - 1, 40));
        assert!(!bitmap.is_dark(80 + 7 * 20, 40));
    }

    #[test]
    fn test_largest_symbol_round_trip() {
        let data = "B3@j🎮#Z%8v🍣K!🔑3zC^8📖&r💾F9*🔐b6🌼".repeat(57);
        // Version 40 spans 177 + 2 * 4 modules, 3 pixels each
        let bitmap = generate(&data, 555, 555).unwrap();
        assert_eq!(decode(bitmap.as_image()), data);
    }

    #[test]
    fn test_small_canvas_still_succeeds() {
        let bitmap = generate(&"x".repeat(500), 10, 10).unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (10, 10));
    }

    #[test]
    fn test_parallel_generation() {
        let texts: Vec<String> = (0..32).map(|i| format!("item-{i}").repeat(i + 1)).collect();
        let sequential: Vec<_> = texts.iter().map(|t| generate(t, 200, 200).unwrap()).collect();

        let gen = Generator::new();
        let parallel: Vec<_> =
            texts.par_iter().map(|t| gen.generate(t, 200, 200).unwrap()).collect();
        assert_eq!(sequential, parallel);
    }
}
