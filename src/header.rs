// src/header.rs
use crate::error::{Fbh5Error, Result};
use crate::types::{AttrValue, Attribute, ElementType};
use crate::utils::trim_nul;

/// Description of one recording, fixed when a session opens.
///
/// Field names follow the SIGPROC filterbank header keywords so the array
/// attributes written from it are recognisable to downstream tools.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Header {
    /// 0 = fake data, 1 = Arecibo, 2 = Ooty, ...
    pub machine_id: i32,
    pub telescope_id: i32,
    /// 1 = filterbank, 2 = time series
    pub data_type: i32,
    pub barycentric: i32,
    pub pulsarcentric: i32,
    /// Right ascension (J2000) of the source, hhmmss.s packed
    pub src_raj: f64,
    /// Declination (J2000) of the source, ddmmss.s packed
    pub src_dej: f64,
    /// Telescope azimuth at start of scan (degrees)
    pub az_start: f64,
    /// Telescope zenith angle at start of scan (degrees)
    pub za_start: f64,
    /// Centre frequency of the first channel (MHz)
    pub fch1: f64,
    /// Channel bandwidth (MHz), may be negative
    pub foff: f64,
    /// Number of fine channels
    pub nchans: i32,
    pub nbeams: i32,
    pub ibeam: i32,
    /// Bits per sample: 8, 16, 32 or 64
    pub nbits: i32,
    /// MJD of the first sample
    pub tstart: f64,
    /// Sample interval (s)
    pub tsamp: f64,
    /// Number of IF channels (feeds), 1..=4
    pub nifs: i32,
    pub source_name: String,
    pub rawdatafile: String,
    /// Fine channels per coarse channel, 0 when unknown
    pub nfpc: i32,
}

impl Header {
    /// Check the invariants a session relies on, failing on the first violation.
    pub fn validate(&self) -> Result<()> {
        if ElementType::from_nbits(self.nbits).is_none() {
            return Err(Fbh5Error::validation(
                "nbits",
                format!("must be in [8, 16, 32, 64] but saw {}", self.nbits),
            ));
        }
        if !(1..=4).contains(&self.nifs) {
            return Err(Fbh5Error::validation(
                "nifs",
                format!("must be in [1, 2, 3, 4] but saw {}", self.nifs),
            ));
        }
        if self.nfpc < 0 {
            return Err(Fbh5Error::validation(
                "nfpc",
                format!("must be > -1 but saw {}", self.nfpc),
            ));
        }
        if self.nfpc > 0 && self.nchans % self.nfpc != 0 {
            return Err(Fbh5Error::validation(
                "nchans",
                format!("must be divisible by nfpc but saw {} / {}", self.nchans, self.nfpc),
            ));
        }
        if self.nchans < 1 {
            return Err(Fbh5Error::validation(
                "nchans",
                format!("must be positive but saw {}", self.nchans),
            ));
        }
        Ok(())
    }

    /// Element type for `nbits`; only meaningful after [`Header::validate`].
    pub fn element_type(&self) -> Option<ElementType> {
        ElementType::from_nbits(self.nbits)
    }

    /// Bytes in one time integration (`nifs * nchans * nbits / 8`)
    pub fn tint_size(&self) -> usize {
        self.nifs.max(0) as usize * self.nchans.max(0) as usize * (self.nbits.max(0) as usize / 8)
    }

    /// Every header field as a named scalar attribute, in declaration order.
    pub fn attributes(&self) -> Vec<Attribute> {
        vec![
            Attribute::new("machine_id", self.machine_id),
            Attribute::new("telescope_id", self.telescope_id),
            Attribute::new("data_type", self.data_type),
            Attribute::new("barycentric", self.barycentric),
            Attribute::new("pulsarcentric", self.pulsarcentric),
            Attribute::new("nchans", self.nchans),
            Attribute::new("nfpc", self.nfpc),
            Attribute::new("nbeams", self.nbeams),
            Attribute::new("ibeam", self.ibeam),
            Attribute::new("nbits", self.nbits),
            Attribute::new("nifs", self.nifs),
            Attribute::new("src_raj", self.src_raj),
            Attribute::new("src_dej", self.src_dej),
            Attribute::new("az_start", self.az_start),
            Attribute::new("za_start", self.za_start),
            Attribute::new("fch1", self.fch1),
            Attribute::new("foff", self.foff),
            Attribute::new("tstart", self.tstart),
            Attribute::new("tsamp", self.tsamp),
            Attribute::new("source_name", trim_nul(&self.source_name)),
            Attribute::new("rawdatafile", trim_nul(&self.rawdatafile)),
        ]
    }

    /// Rebuild a header from attributes previously produced by [`Header::attributes`].
    pub fn from_attributes(attrs: &[Attribute]) -> Result<Self> {
        let lookup = |name: &str| -> Result<&AttrValue> {
            attrs
                .iter()
                .find(|a| a.name == name)
                .map(|a| &a.value)
                .ok_or_else(|| Fbh5Error::Corrupted(format!("missing header attribute '{}'", name)))
        };
        let int = |name: &str| -> Result<i32> {
            lookup(name)?
                .as_int()
                .ok_or_else(|| Fbh5Error::Corrupted(format!("attribute '{}' is not an int", name)))
        };
        let double = |name: &str| -> Result<f64> {
            lookup(name)?
                .as_double()
                .ok_or_else(|| Fbh5Error::Corrupted(format!("attribute '{}' is not a double", name)))
        };
        let string = |name: &str| -> Result<String> {
            lookup(name)?
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| Fbh5Error::Corrupted(format!("attribute '{}' is not a string", name)))
        };

        Ok(Header {
            machine_id: int("machine_id")?,
            telescope_id: int("telescope_id")?,
            data_type: int("data_type")?,
            barycentric: int("barycentric")?,
            pulsarcentric: int("pulsarcentric")?,
            src_raj: double("src_raj")?,
            src_dej: double("src_dej")?,
            az_start: double("az_start")?,
            za_start: double("za_start")?,
            fch1: double("fch1")?,
            foff: double("foff")?,
            nchans: int("nchans")?,
            nbeams: int("nbeams")?,
            ibeam: int("ibeam")?,
            nbits: int("nbits")?,
            tstart: double("tstart")?,
            tsamp: double("tsamp")?,
            nifs: int("nifs")?,
            source_name: string("source_name")?,
            rawdatafile: string("rawdatafile")?,
            nfpc: int("nfpc")?,
        })
    }
}
