//! CSS response-file synthesis from a channel's response stages.
//!
//! For each channel the response blockettes (53, 54, 55, 57, 58, 61,
//! including equivalents derived from the dictionary via blockette 60) are
//! rendered in declaration order as a commented prologue followed by the
//! CSS data stanzas `theoretical N instrument|digitizer paz|fir|fap`.
use log::warn;
use num::complex::Complex64;
use std::f64::consts::PI;

use seed_css_core::blockettes::{
    Blockette, Blockette33, Blockette53, Blockette54, Blockette55, Blockette57, Blockette58,
    Blockette61,
};
use seed_css_core::dictionary::Dictionary;
use seed_css_core::station::{Channel, Station};

/// C-style scientific notation with a signed two-digit exponent, e.g.
/// `8.608310E+04`, right-padded into `width` columns.
fn sci(v: f64, width: usize) -> String {
    let s = format!("{:.6E}", v);
    let (mantissa, exp) = match s.split_once('E') {
        Some(p) => p,
        None => (s.as_str(), "0"),
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    let formatted = format!("{}E{}{:02}", mantissa, if exp < 0 { '-' } else { '+' }, exp.abs());
    format!("{:>width$}", formatted, width = width)
}

struct RespBuf {
    /// The volume-level prologue written once the stage-0 sensitivity is
    /// seen.
    start_header: String,
    /// Per-stage commented metadata.
    header: String,
    /// The CSS data stanzas.
    data: String,
}

/// Synthesise the CSS response text for one channel.
pub fn css_response(station: &Station, channel: &Channel, dictionary: &Dictionary) -> String {
    let mut buf = RespBuf {
        start_header: String::new(),
        header: String::new(),
        data: String::new(),
    };

    let mut a0_norm_freq = 1.0;
    let mut scaled_sens = 1.0;
    let mut sensitivity_freq = 0.0;
    let mut digitizer = String::new();
    let mut b53_type = String::new();
    let mut stage = 0;

    let mut i = 0;
    while i < channel.response.len() {
        match &channel.response[i] {
            Blockette::B53(b53) => {
                b53_type = b53.transfer_type.clone();
                process53(dictionary, &mut buf, b53);
                stage = b53.stage;
                a0_norm_freq = b53.norm_freq;
            }
            Blockette::B54(b54) => {
                // some generators split numerator and denominator across two
                // consecutive blockettes 54; merge them into one FIR block
                let b54b = channel.response.get(i + 1).and_then(|b| match b {
                    Blockette::B54(x) => Some(x),
                    _ => None,
                });
                process54(dictionary, &mut buf, b54, b54b, channel);
                stage = b54.stage;
                if b54b.is_some() {
                    i += 1;
                }
            }
            Blockette::B55(b55) => {
                process55(dictionary, &mut buf, b55);
                stage = b55.stage;
            }
            Blockette::B57(b57) => {
                process57(&mut buf, b57);
                stage = b57.stage;
            }
            Blockette::B58(b58) => {
                process58(&mut buf, b58, stage, &mut scaled_sens, sensitivity_freq);
                stage = b58.stage;
                if b58.stage == 0 {
                    start_header(
                        &mut buf,
                        station,
                        channel,
                        dictionary.get_b33(channel.b52.instrument),
                        &digitizer,
                        a0_norm_freq,
                        scaled_sens,
                        sensitivity_freq,
                    );
                } else if sensitivity_freq == 0. {
                    sensitivity_freq = b58.frequency;
                }
            }
            Blockette::B61(b61) => {
                process61(dictionary, &mut buf, b61, &b53_type, channel);
                stage = b61.stage;
                digitizer = b61.name.clone();
            }
            _ => {}
        }
        i += 1;
    }

    let mut out = buf.start_header;
    out.push_str(&buf.header);
    out.push_str(&buf.data);
    out
}

#[allow(clippy::too_many_arguments)]
fn start_header(
    buf: &mut RespBuf,
    station: &Station,
    channel: &Channel,
    b33: Option<&Blockette33>,
    digitizer: &str,
    a0_norm_freq: f64,
    scaled_sens: f64,
    sensitivity_freq: f64,
) {
    let insname = b33.map(|b| b.description.as_str()).unwrap_or("");
    let s = &mut buf.start_header;
    s.push_str(&format!(
        "# Displacement response for {} station {}\n#\n",
        station.b50.network, station.b50.station
    ));
    s.push_str(&format!("# Seismometer type      = {}\n", insname));
    s.push_str(&format!("# Digitizer type        = {}\n", digitizer));
    s.push_str(&format!(
        "# Data sample rate      = {} s/s\n#\n#\n",
        channel.b52.sample_rate
    ));
    s.push_str("# One zero has been added to convert velocity to displacement,\n");
    s.push_str("# and two zeros have been added to convert acceleration to displacement.\n");
    s.push_str(&format!(
        "# Normalization A0 is calculated for displacement at {} Hz.\n#\n",
        a0_norm_freq
    ));
    s.push_str("# Following comments are extracted for reference purpose.\n");
    s.push_str("#----------------------------------------------------\n");
    s.push_str(&format!(
        "# The sensitivity of channel is {:6.4} counts/(nm/s)\n",
        scaled_sens * 1.0e-9
    ));
    s.push_str(&format!(
        "# at frequency of {:4.2} Hz\n#\n",
        sensitivity_freq
    ));
}

fn unit_name(dictionary: &Dictionary, code: i32) -> String {
    dictionary
        .get_b34(code)
        .map(|b| b.name.clone())
        .unwrap_or_default()
}

/// Emit a poles-and-zeros stage.
///
/// Transfer function type "B" (analog, Hz) scales every pole and zero by 2π;
/// displacement-derivative input units append (0,0) zeros, one for m/s and
/// two for m/s**2. A0 is recomputed analytically at the normalisation
/// frequency from the extended pole/zero set.
fn process53(dictionary: &Dictionary, buf: &mut RespBuf, b53: &Blockette53) {
    let fac = if b53.transfer_type == "B" { 2. * PI } else { 1.0 };

    let poles: Vec<Complex64> = b53
        .pr
        .iter()
        .zip(b53.pi.iter())
        .map(|(&re, &im)| Complex64::new(re * fac, im * fac))
        .collect();
    let mut zeros: Vec<Complex64> = b53
        .zr
        .iter()
        .zip(b53.zi.iter())
        .map(|(&re, &im)| Complex64::new(re * fac, im * fac))
        .collect();
    let mut zero_errors: Vec<(f64, f64)> = b53
        .zr_error
        .iter()
        .zip(b53.zi_error.iter())
        .map(|(&re, &im)| (re, im))
        .collect();

    // convert velocity and acceleration input units to displacement
    let input_units = unit_name(dictionary, b53.input_units);
    let nadd = if input_units.eq_ignore_ascii_case("M/S") {
        1
    } else if input_units.eq_ignore_ascii_case("M/S**2") {
        2
    } else {
        0
    };
    for _ in 0..nadd {
        zeros.push(Complex64::new(0., 0.));
        zero_errors.push((0., 0.));
    }

    let a0 = a0_normalization(&poles, &zeros, b53.norm_freq);

    let h = &mut buf.header;
    h.push_str(&format!("#  stage-{}\n", b53.stage));
    h.push_str("#     Response type:                  A Laplace Transform (Rad/sec)\n");
    h.push_str(&format!(
        "#     Response in units:              {}\n",
        input_units
    ));
    h.push_str(&format!(
        "#     Response out units:             {}\n",
        unit_name(dictionary, b53.output_units)
    ));
    h.push_str(&format!(
        "#     A0 normalization factor:        {}\n",
        sci(a0, 12)
    ));
    h.push_str(&format!(
        "#     N normalization frequency:      {}\n",
        sci(b53.norm_freq, 12)
    ));

    if !zeros.is_empty() || !poles.is_empty() {
        let d = &mut buf.data;
        if b53.transfer_type == "D" {
            d.push_str(&format!(" theoretical  {}    digitizer paz\n", b53.stage));
        } else {
            d.push_str(&format!(" theoretical  {}   instrument paz\n", b53.stage));
        }
        d.push_str(&format!("{}\n", sci(a0, 13)));

        d.push_str(&format!("{}\n", poles.len()));
        for (j, p) in poles.iter().enumerate() {
            d.push_str(&format!(
                "{}   {}    {}   {}\n",
                sci(p.re, 13),
                sci(p.im, 13),
                sci(b53.pr_error[j], 8),
                sci(b53.pi_error[j], 8)
            ));
        }
        d.push_str(&format!("{}\n", zeros.len()));
        for (j, z) in zeros.iter().enumerate() {
            d.push_str(&format!(
                "{}   {}    {}   {}\n",
                sci(z.re, 13),
                sci(z.im, 13),
                sci(zero_errors[j].0, 8),
                sci(zero_errors[j].1, 8)
            ));
        }
    }
}

/// `A0 = |Π(jωn − p)| / |Π(jωn − z)|` at the normalization frequency.
pub fn a0_normalization(poles: &[Complex64], zeros: &[Complex64], norm_freq: f64) -> f64 {
    let jw = Complex64::new(0., 2. * PI * norm_freq);
    let num: Complex64 = zeros.iter().map(|z| jw - z).product();
    let dnom: Complex64 = poles.iter().map(|p| jw - p).product();
    dnom.norm() / num.norm()
}

/// The input sampling rate of a FIR stage comes from the channel's first
/// decimation blockette.
fn input_sample_rate(channel: &Channel) -> Option<f64> {
    channel.response.iter().find_map(|b| match b {
        Blockette::B57(x) => Some(x.input_sample_rate),
        _ => None,
    })
}

fn process54(
    dictionary: &Dictionary,
    buf: &mut RespBuf,
    b54: &Blockette54,
    b54b: Option<&Blockette54>,
    channel: &Channel,
) {
    let h = &mut buf.header;
    h.push_str(&format!("#  stage-{}\n", b54.stage));
    if b54.transfer_type == "A" {
        h.push_str("#     Response type:                  A  Laplace Transform (Rad/sec)\n");
    } else {
        h.push_str(&format!(
            "#     Response type:                  {}\n",
            b54.transfer_type
        ));
    }
    h.push_str(&format!(
        "#     Response in units:              {}\n",
        unit_name(dictionary, b54.input_units)
    ));
    h.push_str(&format!(
        "#     Response out units:             {}\n",
        unit_name(dictionary, b54.output_units)
    ));

    let num_n = b54.numerator.len() + b54b.map(|b| b.numerator.len()).unwrap_or(0);
    let num_d = b54.denominator.len() + b54b.map(|b| b.denominator.len()).unwrap_or(0);
    if num_n == 0 && num_d == 0 {
        return;
    }

    let rate = match input_sample_rate(channel) {
        Some(r) => r,
        None => {
            warn!("missing blockette 57");
            return;
        }
    };

    let d = &mut buf.data;
    if b54.transfer_type == "D" {
        d.push_str(&format!(" theoretical  {}    digitizer fir\n", b54.stage));
    } else {
        d.push_str(&format!(" theoretical  {}   instrument fir\n", b54.stage));
    }
    d.push_str(&format!("{}\n", rate));

    d.push_str(&format!("{}\n", num_n));
    for (n, e) in b54.numerator.iter().zip(b54.nerror.iter()) {
        d.push_str(&format!("{}    {}\n", sci(*n, 13), sci(*e, 13)));
    }
    if let Some(b) = b54b {
        for (n, e) in b.numerator.iter().zip(b.nerror.iter()) {
            d.push_str(&format!("{}    {}\n", sci(*n, 13), sci(*e, 13)));
        }
    }
    d.push_str(&format!("{}\n", num_d));
    for (n, e) in b54.denominator.iter().zip(b54.derror.iter()) {
        d.push_str(&format!("{}    {}\n", sci(*n, 13), sci(*e, 13)));
    }
    if let Some(b) = b54b {
        for (n, e) in b.denominator.iter().zip(b.derror.iter()) {
            d.push_str(&format!("{}    {}\n", sci(*n, 13), sci(*e, 13)));
        }
    }
}

/// Emit a frequency/amplitude/phase list stage.
fn process55(dictionary: &Dictionary, buf: &mut RespBuf, b55: &Blockette55) {
    let h = &mut buf.header;
    h.push_str(&format!("#  stage-{}\n", b55.stage));
    h.push_str(&format!(
        "#     Response in units:              {}\n",
        unit_name(dictionary, b55.input_units)
    ));
    h.push_str(&format!(
        "#     Response out units:             {}\n",
        unit_name(dictionary, b55.output_units)
    ));

    let nfap = b55.frequency.len();
    if nfap == 0 {
        return;
    }
    let d = &mut buf.data;
    d.push_str(&format!(" theoretical  {}   instrument fap\n", b55.stage));
    d.push_str(&format!("{}\n", nfap));
    for j in 0..nfap {
        d.push_str(&format!(
            "{}  {}  {}   {}  {}\n",
            sci(b55.frequency[j], 13),
            sci(b55.amplitude[j], 13),
            sci(b55.phase[j], 13),
            sci(b55.amp_error[j], 8),
            sci(b55.phase_error[j], 8)
        ));
    }
}

/// Decorate the prior stage's header block with decimation parameters.
fn process57(buf: &mut RespBuf, b57: &Blockette57) {
    let h = &mut buf.header;
    h.push_str(&format!(
        "#     Response input sampling rate:   {}\n",
        b57.input_sample_rate
    ));
    h.push_str(&format!(
        "#     Response decimation factor:     {}\n",
        b57.decimation_factor
    ));
    h.push_str(&format!(
        "#     Response decimation offset:     {}\n",
        b57.decimation_offset
    ));
    h.push_str(&format!(
        "#     Response delay:                 {}\n",
        sci(b57.delay, 12)
    ));
    h.push_str(&format!(
        "#     Response correction:            {}\n",
        sci(b57.correction, 12)
    ));
}

/// Per-stage sensitivity lines; non-zero stages accumulate the scaled
/// sensitivity product reported in the stage-0 prologue.
fn process58(
    buf: &mut RespBuf,
    b58: &Blockette58,
    stage: i32,
    scaled_sens: &mut f64,
    sensitivity_freq: f64,
) {
    if b58.stage == 0 {
        return;
    }
    *scaled_sens *= b58.sensitivity;

    let h = &mut buf.header;
    if b58.stage != stage {
        h.push_str(&format!("#  stage-{}\n", b58.stage));
    }
    h.push_str(&format!(
        "#     Sensitivity:                    {}\n",
        sci(b58.sensitivity, 12)
    ));
    h.push_str(&format!(
        "#     Frequency of sensitivity:       {}\n#\n",
        sci(sensitivity_freq, 12)
    ));
}

/// Expand a FIR stage per its symmetry code: "A" uses the coefficients as
/// declared, "B" mirrors around the last coefficient (odd length), "C"
/// mirrors around the midpoint (even length).
fn process61(
    dictionary: &Dictionary,
    buf: &mut RespBuf,
    b61: &Blockette61,
    b53_type: &str,
    channel: &Channel,
) {
    let h = &mut buf.header;
    h.push_str(&format!("#  stage-{}\n", b61.stage));
    h.push_str(&format!(
        "#     Response type:                  {} Laplace Transform (Rad/sec)\n",
        b53_type
    ));
    h.push_str(&format!(
        "#     Response in units:              {}\n",
        unit_name(dictionary, b61.input_units)
    ));
    h.push_str(&format!(
        "#     Response out units:             {}\n",
        unit_name(dictionary, b61.output_units)
    ));

    let coef = expand_fir(&b61.symmetry_code, &b61.coef);
    if coef.is_empty() {
        return;
    }

    let rate = match input_sample_rate(channel) {
        Some(r) => r,
        None => {
            warn!("missing blockette 57");
            return;
        }
    };

    let d = &mut buf.data;
    if b53_type == "D" {
        d.push_str(&format!(" theoretical  {}    digitizer fir\n", b61.stage));
    } else {
        d.push_str(&format!(" theoretical  {}   instrument fir\n", b61.stage));
    }
    d.push_str(&format!("{}\n", rate));
    d.push_str(&format!("{}\n", coef.len()));
    for c in &coef {
        d.push_str(&format!("{}    0.00E+00\n", sci(*c, 13)));
    }
    d.push_str("0\n");
}

/// FIR symmetry expansion.
pub fn expand_fir(symmetry_code: &str, coef: &[f64]) -> Vec<f64> {
    match symmetry_code {
        "B" => {
            // odd length, mirrored around the final coefficient
            let n = coef.len();
            if n == 0 {
                return vec![];
            }
            let mut out = vec![0.; 2 * n - 1];
            for j in 0..n - 1 {
                out[j] = coef[j];
                out[2 * n - 2 - j] = coef[j];
            }
            out[n - 1] = coef[n - 1];
            out
        }
        "C" => {
            // even length, mirrored around the midpoint
            let n = coef.len();
            let mut out = vec![0.; 2 * n];
            for j in 0..n {
                out[j] = coef[j];
                out[2 * n - 1 - j] = coef[j];
            }
            out
        }
        _ => coef.to_vec(),
    }
}
