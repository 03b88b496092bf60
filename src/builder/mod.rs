mod qr;

pub use qr::QR;

use log::{debug, trace};

use crate::common::{
    bitstream::BitStream,
    codec::{encode, encode_with_version},
    ec::{ecc, interleave},
    error::QRResult,
    mask::{apply_best_mask, MaskPattern},
    metadata::{ECLevel, Version},
};

pub struct QRBuilder<'a> {
    data: &'a [u8],
    version: Option<Version>,
    ec_level: ECLevel,
    mask: Option<MaskPattern>,
}

impl<'a> QRBuilder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, version: None, ec_level: ECLevel::M, mask: None }
    }

    pub fn data(&mut self, data: &'a [u8]) -> &mut Self {
        self.data = data;
        self
    }

    pub fn version(&mut self, version: Version) -> &mut Self {
        self.version = Some(version);
        self
    }

    pub fn unset_version(&mut self) -> &mut Self {
        self.version = None;
        self
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    pub fn mask(&mut self, mask: MaskPattern) -> &mut Self {
        self.mask = Some(mask);
        self
    }

    pub fn metadata(&self) -> String {
        match self.version {
            Some(v) => format!("{{ Version: {}, Ec level: {:?} }}", *v, self.ec_level),
            None => format!("{{ Version: None, Ec level: {:?} }}", self.ec_level),
        }
    }
}


impl QRBuilder<'_> {
    pub fn build(&self) -> QRResult<QR> {
        debug!("Generating QR {} for {} bytes", self.metadata(), self.data.len());

        let (encoded_data, version) = match self.version {
            Some(v) => (encode_with_version(self.data, self.ec_level, v)?, v),
            None => encode(self.data, self.ec_level)?,
        };
        trace!("Encoded {} bits into version {version}", encoded_data.len());

        let payload = Self::construct_payload(encoded_data.data(), version, self.ec_level);

        let mut qr = QR::new(version, self.ec_level);
        qr.draw_all_function_patterns();
        qr.draw_encoding_region(payload);

        let mask = match self.mask {
            Some(m) => {
                qr.apply_mask(m);
                m
            }
            None => apply_best_mask(&mut qr),
        };

        let total_modules = version.width() * version.width();
        debug!(
            "QR generated: version {version}, mask {}, dark modules {}%",
            *mask,
            qr.count_dark_modules() * 100 / total_modules
        );

        Ok(qr)
    }

    // Data codewords interleaved across blocks, followed by interleaved ecc codewords
    fn construct_payload(data: &[u8], version: Version, ec_level: ECLevel) -> BitStream {
        let (data_blocks, ecc_blocks) = ecc(data, version, ec_level);
        let mut payload = BitStream::new(version.total_codewords() << 3);
        payload.extend(&interleave(&data_blocks));
        payload.extend(&interleave(&ecc_blocks));
        payload
    }
}
