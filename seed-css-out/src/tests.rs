mod tables {
    use crate::tables::*;

    #[test]
    fn affiliation_roundtrip() {
        let row = Affiliation {
            net: "II".to_string(),
            sta: "ABKT".to_string(),
            lddate: "04/09/20 00:00:00".to_string(),
        };
        assert_eq!(Affiliation::from_line(&row.to_line()).unwrap(), row);
    }

    #[test]
    fn site_roundtrip() {
        let row = Site {
            sta: "ABKT".to_string(),
            ondate: 2020001,
            offdate: -1,
            lat: 37.9304,
            lon: 58.1189,
            elev: 0.678,
            staname: "Alibek, Turkmenistan".to_string(),
            statype: "-".to_string(),
            refsta: "ABKT".to_string(),
            dnorth: 0.,
            deast: 0.,
            lddate: "04/09/20 00:00:00".to_string(),
        };
        assert_eq!(Site::from_line(&row.to_line()).unwrap(), row);
    }

    #[test]
    fn sitechan_roundtrip() {
        let row = Sitechan {
            sta: "ABKT".to_string(),
            chan: "BHZ".to_string(),
            ondate: 2020001,
            chanid: 7,
            offdate: -1,
            ctype: "n".to_string(),
            edepth: 0.007,
            hang: 0.,
            vang: 0.,
            descrip: "Streckeisen STS-1".to_string(),
            lddate: "04/09/20 00:00:00".to_string(),
        };
        assert_eq!(Sitechan::from_line(&row.to_line()).unwrap(), row);
    }

    #[test]
    fn sensor_roundtrip() {
        let row = Sensor {
            sta: "ABKT".to_string(),
            chan: "BHZ".to_string(),
            time: 1577836800.,
            endtime: ENDTIME_NULL,
            inid: 3,
            chanid: 7,
            jdate: 2020001,
            calratio: 1.,
            calper: 1.,
            tshift: 0.,
            instant: "y".to_string(),
            lddate: "04/09/20 00:00:00".to_string(),
        };
        assert_eq!(Sensor::from_line(&row.to_line()).unwrap(), row);
    }

    #[test]
    fn instrument_roundtrip() {
        let row = Instrument {
            inid: 3,
            insname: "Streckeisen STS-1".to_string(),
            instype: "Streck".to_string(),
            band: "-".to_string(),
            digital: "d".to_string(),
            samprate: 40.,
            ncalib: 0.2533,
            ncalper: 1.,
            dir: "resp".to_string(),
            dfile: "II.ABKT.BHZ.2020001".to_string(),
            rsptype: "paz".to_string(),
            lddate: "04/09/20 00:00:00".to_string(),
        };
        assert_eq!(Instrument::from_line(&row.to_line()).unwrap(), row);
    }

    #[test]
    fn wfdisc_roundtrip() {
        let row = Wfdisc {
            sta: "ABKT".to_string(),
            chan: "BHZ".to_string(),
            time: 1586390400.,
            wfid: 1,
            chanid: 7,
            jdate: 2020100,
            endtime: 1586390412.475,
            nsamp: 500,
            samprate: 40.,
            calib: 0.2533,
            calper: 1.,
            instype: "-".to_string(),
            segtype: "o".to_string(),
            datatype: host_float_datatype().to_string(),
            clip: "-".to_string(),
            dir: ".".to_string(),
            dfile: "ABKT.BHZ.1.w".to_string(),
            foff: 0,
            commid: -1,
            lddate: "04/09/20 00:00:00".to_string(),
        };
        assert_eq!(Wfdisc::from_line(&row.to_line()).unwrap(), row);
    }
}

mod response {
    use std::f64::consts::PI;

    use num::complex::Complex64;
    use seed_css_core::blockettes::*;
    use seed_css_core::dictionary::Dictionary;
    use seed_css_core::station::{Channel, Station};

    use crate::response::{a0_normalization, css_response, expand_fir};

    #[test]
    fn a0_single_pole() {
        // |j2π - (-1)| = sqrt(1 + 4π²)
        let poles = vec![Complex64::new(-1., 0.)];
        let a0 = a0_normalization(&poles, &[], 1.0);
        assert!((a0 - (1. + 4. * PI * PI).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn a0_pole_and_zero() {
        let poles = vec![Complex64::new(-1., 0.), Complex64::new(-2., 0.)];
        let zeros = vec![Complex64::new(0., 0.)];
        let w = 2. * PI;
        let expect = ((1f64 + w * w).sqrt() * (4. + w * w).sqrt()) / w;
        let a0 = a0_normalization(&poles, &zeros, 1.0);
        assert!((a0 - expect).abs() < 1e-9);
    }

    #[test]
    fn fir_symmetry_expansion() {
        // "A": as declared
        assert_eq!(expand_fir("A", &[1., 2., 3.]), vec![1., 2., 3.]);
        // "B": odd length, mirrored around the last coefficient
        assert_eq!(expand_fir("B", &[1., 2., 3.]), vec![1., 2., 3., 2., 1.]);
        // "C": even length, mirrored around the midpoint
        assert_eq!(expand_fir("C", &[1., 2., 3.]), vec![1., 2., 3., 3., 2., 1.]);
    }

    fn velocity_dictionary() -> Dictionary {
        let mut d = Dictionary::default();
        d.add(&Blockette::B34(Blockette34 {
            lookup_code: 4,
            name: "M/S".to_string(),
            description: "Velocity in Meters Per Second".to_string(),
        }));
        d.add(&Blockette::B34(Blockette34 {
            lookup_code: 2,
            name: "COUNTS".to_string(),
            description: "Digital Counts".to_string(),
        }));
        d.add(&Blockette::B34(Blockette34 {
            lookup_code: 9,
            name: "M".to_string(),
            description: "Displacement in Meters".to_string(),
        }));
        d.add(&Blockette::B33(Blockette33 {
            lookup_code: 1,
            description: "Streckeisen STS-1".to_string(),
        }));
        d
    }

    fn test_station() -> Station {
        Station::new(Blockette50 {
            station: "ABKT".to_string(),
            network: "II".to_string(),
            ..Blockette50::default()
        })
    }

    fn b53_velocity() -> Blockette53 {
        Blockette53 {
            transfer_type: "A".to_string(),
            stage: 1,
            input_units: 4,
            output_units: 2,
            a0_norm: 1.0,
            norm_freq: 1.0,
            zr: vec![0.0],
            zi: vec![0.0],
            zr_error: vec![0.0],
            zi_error: vec![0.0],
            pr: vec![-0.0123, -0.0123, -39.18],
            pi: vec![0.0123, -0.0123, 0.0],
            pr_error: vec![0.0; 3],
            pi_error: vec![0.0; 3],
            ..Blockette53::default()
        }
    }

    fn stage0_b58() -> Blockette58 {
        Blockette58 {
            stage: 0,
            sensitivity: 6.28e8,
            frequency: 1.0,
            ..Blockette58::default()
        }
    }

    #[test]
    fn velocity_channel_gains_a_zero() {
        let d = velocity_dictionary();
        let station = test_station();
        let mut channel = Channel::new(Blockette52 {
            channel: "BHZ".to_string(),
            instrument: 1,
            signal_units: 4,
            calib_units: 2,
            sample_rate: 40.0,
            ..Blockette52::default()
        });
        channel.add(Blockette::B53(b53_velocity()));
        channel.add(Blockette::B58(stage0_b58()));

        let resp = css_response(&station, &channel, &d);

        assert!(resp.contains("# Displacement response for II station ABKT"));
        assert!(resp.contains("# Seismometer type      = Streckeisen STS-1"));
        assert!(resp.contains(" theoretical  1   instrument paz"));

        // one (0,0) zero appended to the original one
        let lines: Vec<&str> = resp.lines().collect();
        let paz = lines
            .iter()
            .position(|l| l.contains("instrument paz"))
            .unwrap();
        // a0, npoles, 3 pole rows, nzeros
        assert_eq!(lines[paz + 2].trim(), "3");
        assert_eq!(lines[paz + 6].trim(), "2");
    }

    #[test]
    fn displacement_paz_roundtrip() {
        // input units "M": no added zeros, type "A": no 2π scaling, so the
        // stanza reproduces the declared poles and zeros exactly
        let d = velocity_dictionary();
        let station = test_station();
        let mut b53 = b53_velocity();
        b53.input_units = 9; // M
        let mut channel = Channel::new(Blockette52 {
            channel: "BHZ".to_string(),
            instrument: 1,
            signal_units: 9,
            calib_units: 2,
            sample_rate: 40.0,
            ..Blockette52::default()
        });
        channel.add(Blockette::B53(b53.clone()));
        channel.add(Blockette::B58(stage0_b58()));

        let resp = css_response(&station, &channel, &d);
        let lines: Vec<&str> = resp.lines().collect();
        let paz = lines
            .iter()
            .position(|l| l.contains("instrument paz"))
            .unwrap();

        let npoles: usize = lines[paz + 2].trim().parse().unwrap();
        assert_eq!(npoles, b53.pr.len());
        for j in 0..npoles {
            let row: Vec<f64> = lines[paz + 3 + j]
                .split_whitespace()
                .map(|v| v.parse().unwrap())
                .collect();
            assert!((row[0] - b53.pr[j]).abs() < 1e-9);
            assert!((row[1] - b53.pi[j]).abs() < 1e-9);
        }
        let nzeros: usize = lines[paz + 3 + npoles].trim().parse().unwrap();
        assert_eq!(nzeros, b53.zr.len());
        for j in 0..nzeros {
            let row: Vec<f64> = lines[paz + 4 + npoles + j]
                .split_whitespace()
                .map(|v| v.parse().unwrap())
                .collect();
            assert!((row[0] - b53.zr[j]).abs() < 1e-9);
            assert!((row[1] - b53.zi[j]).abs() < 1e-9);
        }
    }

    #[test]
    fn type_b_scales_by_two_pi() {
        let d = velocity_dictionary();
        let station = test_station();
        let mut b53 = b53_velocity();
        b53.transfer_type = "B".to_string();
        b53.input_units = 9;
        let mut channel = Channel::new(Blockette52 {
            channel: "BHZ".to_string(),
            signal_units: 9,
            ..Blockette52::default()
        });
        channel.add(Blockette::B53(b53.clone()));
        channel.add(Blockette::B58(stage0_b58()));

        let resp = css_response(&station, &channel, &d);
        let lines: Vec<&str> = resp.lines().collect();
        let paz = lines
            .iter()
            .position(|l| l.contains("instrument paz"))
            .unwrap();
        let row: Vec<f64> = lines[paz + 3]
            .split_whitespace()
            .map(|v| v.parse().unwrap())
            .collect();
        // the stanza carries seven significant figures
        assert!((row[0] - b53.pr[0] * 2. * PI).abs() < 1e-7);
    }

    #[test]
    fn fir_stage_uses_decimation_input_rate() {
        let d = velocity_dictionary();
        let station = test_station();
        let mut channel = Channel::new(Blockette52 {
            channel: "BHZ".to_string(),
            ..Blockette52::default()
        });
        channel.add(Blockette::B61(Blockette61 {
            stage: 2,
            name: "DEC16".to_string(),
            symmetry_code: "A".to_string(),
            input_units: 2,
            output_units: 2,
            coef: vec![0.25, 0.5, 0.25],
            from_b41: false,
        }));
        channel.add(Blockette::B57(Blockette57 {
            stage: 2,
            input_sample_rate: 5120.0,
            decimation_factor: 16,
            ..Blockette57::default()
        }));
        channel.add(Blockette::B58(stage0_b58()));

        let resp = css_response(&station, &channel, &d);
        assert!(resp.contains(" theoretical  2   instrument fir"));
        assert!(resp.contains("5120"));
        assert!(resp.contains("# Digitizer type        = DEC16"));
        // decimation decorates the header comments
        assert!(resp.contains("#     Response decimation factor:     16"));
    }
}

mod convert {
    use std::fs;

    use seed_css_core::blockettes::*;

    use crate::convert::{convert_to_css, ConvertOptions};
    use crate::tables::*;

    fn frame(btype: u32, body: &str) -> String {
        format!("{:03}{:04}{}", btype, 7 + body.len(), body)
    }

    fn control_volume(blockettes: &[String], lreclen: usize) -> Vec<u8> {
        let payload: String = blockettes.concat();
        let bytes = payload.as_bytes();
        let mut out = vec![];
        let mut seq = 1;
        let mut i = 0;
        while i < bytes.len() {
            let cont = if seq == 1 { ' ' } else { '*' };
            out.extend_from_slice(format!("{:06}V{}", seq, cont).as_bytes());
            let n = (lreclen - 8).min(bytes.len() - i);
            out.extend_from_slice(&bytes[i..i + n]);
            i += n;
            if i >= bytes.len() {
                out.resize(out.len() + (lreclen - 8 - n), b' ');
            }
            seq += 1;
        }
        out
    }

    /// A big-endian int32 data record with a blockette 1000, padded to 512.
    fn data_record(seqno: u32, start_sec: u8, samples: &[i32]) -> Vec<u8> {
        let mut out = vec![];
        out.extend_from_slice(format!("{:06}D ", seqno).as_bytes());
        out.extend_from_slice(b"ABKT ");
        out.extend_from_slice(b"  ");
        out.extend_from_slice(b"BHZ");
        out.extend_from_slice(b"II");
        out.extend_from_slice(&2020u16.to_be_bytes());
        out.extend_from_slice(&100u16.to_be_bytes());
        out.extend_from_slice(&[0, 0, start_sec, 0]);
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&(samples.len() as u16).to_be_bytes());
        out.extend_from_slice(&40i16.to_be_bytes());
        out.extend_from_slice(&1i16.to_be_bytes());
        out.extend_from_slice(&[0, 0, 0, 1]);
        out.extend_from_slice(&0i32.to_be_bytes());
        out.extend_from_slice(&64u16.to_be_bytes());
        out.extend_from_slice(&48u16.to_be_bytes());
        assert_eq!(out.len(), 48);
        out.extend_from_slice(&1000u16.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&[3, 1, 9, 0]);
        out.resize(64, 0);
        for s in samples {
            out.extend_from_slice(&s.to_be_bytes());
        }
        out.resize(512, 0);
        out
    }

    fn test_volume() -> Vec<u8> {
        let b50 = Blockette50 {
            station: "ABKT".to_string(),
            latitude: 37.9304,
            longitude: 58.1189,
            elevation: 678.0,
            num_channels: 1,
            name: "Alibek".to_string(),
            network_id: 1,
            start: seed_css_core::SeedTime::parse("2020,001", "t").unwrap(),
            end: seed_css_core::SeedTime::parse("", "t").unwrap(),
            update: "N".to_string(),
            network: "II".to_string(),
            ..Blockette50::default()
        };
        let b52 = Blockette52 {
            channel: "BHZ".to_string(),
            instrument: 1,
            signal_units: 4,
            calib_units: 2,
            latitude: 37.9304,
            longitude: 58.1189,
            elevation: 678.0,
            local_depth: 7.0,
            dip: -90.0,
            format_code: 1,
            reclen: 9,
            sample_rate: 40.0,
            clock_drift: 1e-4,
            channel_flags: "CG".to_string(),
            start: seed_css_core::SeedTime::parse("2020,001", "t").unwrap(),
            end: seed_css_core::SeedTime::parse("", "t").unwrap(),
            update: "N".to_string(),
            subchannel: -1,
            ..Blockette52::default()
        };
        let b53 = Blockette53 {
            transfer_type: "A".to_string(),
            stage: 1,
            input_units: 4,
            output_units: 2,
            a0_norm: 1.0,
            norm_freq: 1.0,
            zr: vec![0.0],
            zi: vec![0.0],
            zr_error: vec![0.0],
            zi_error: vec![0.0],
            pr: vec![-0.0123],
            pi: vec![0.0123],
            pr_error: vec![0.0],
            pi_error: vec![0.0],
            ..Blockette53::default()
        };
        let b58 = Blockette58 {
            stage: 0,
            sensitivity: 6.28e8,
            frequency: 1.0,
            ..Blockette58::default()
        };

        let blockettes = vec![
            frame(10, " 2.312~~~IDC~~"),
            frame(
                34,
                &Blockette34 {
                    lookup_code: 4,
                    name: "M/S".to_string(),
                    description: "Velocity in Meters Per Second".to_string(),
                }
                .to_seed_string(),
            ),
            frame(
                34,
                &Blockette34 {
                    lookup_code: 2,
                    name: "COUNTS".to_string(),
                    description: "Digital Counts".to_string(),
                }
                .to_seed_string(),
            ),
            frame(33, "  1Streckeisen STS-1~"),
            frame(50, &b50.to_seed_string()),
            frame(52, &b52.to_seed_string()),
            frame(53, &b53.to_seed_string()),
            frame(58, &b58.to_seed_string()),
        ];
        let mut volume = control_volume(&blockettes, 4096);
        volume.extend(data_record(2, 0, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]));
        volume.extend(data_record(3, 10, &[11, 12, 13, 14, 15]));
        volume
    }

    #[test]
    fn end_to_end_conversion() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let seed_path = tmp.path().join("test.seed");
        fs::write(&seed_path, test_volume()).unwrap();

        let out = tmp.path().join("css");
        let resp = tmp.path().join("resp");
        let opts = ConvertOptions {
            dir: out.to_string_lossy().to_string(),
            prefix: "local".to_string(),
            respdir: resp.to_string_lossy().to_string(),
            geo_table_dir: None,
            update: false,
            getdata: true,
        };
        let summary = convert_to_css(seed_path.to_str().unwrap(), &opts).unwrap();
        assert_eq!(summary.stations, 1);
        assert_eq!(summary.channels, 1);
        // the two records are 10 s apart at 40 Hz: two segments
        assert_eq!(summary.segments, 2);

        let affiliation = fs::read_to_string(out.join("local.affiliation")).unwrap();
        let row = Affiliation::from_line(affiliation.lines().next().unwrap()).unwrap();
        assert_eq!(row.net, "II");
        assert_eq!(row.sta, "ABKT");

        let site = fs::read_to_string(out.join("local.site")).unwrap();
        let row = Site::from_line(site.lines().next().unwrap()).unwrap();
        assert_eq!(row.ondate, 2020001);
        assert_eq!(row.offdate, -1);
        assert!((row.elev - 0.678).abs() < 1e-9);

        let sitechan = fs::read_to_string(out.join("local.sitechan")).unwrap();
        let row = Sitechan::from_line(sitechan.lines().next().unwrap()).unwrap();
        assert_eq!(row.chan, "BHZ");
        assert_eq!(row.chanid, 1);
        assert_eq!(row.vang, 0.0); // SEED dip -90 is vertical

        let instrument = fs::read_to_string(out.join("local.instrument")).unwrap();
        let inst = Instrument::from_line(instrument.lines().next().unwrap()).unwrap();
        assert_eq!(inst.inid, 1);
        assert_eq!(inst.rsptype, "paz");
        assert_eq!(inst.dfile, "II.ABKT.BHZ.2020001");
        let expected_calib = 1.0e9 / (6.28e8 * 2.0 * std::f64::consts::PI);
        assert!((inst.ncalib - expected_calib).abs() < 1e-6);

        // the response file exists and has the PAZ stanza
        let resp_text = fs::read_to_string(resp.join("II.ABKT.BHZ.2020001")).unwrap();
        assert!(resp_text.contains("instrument paz"));
        assert!(resp_text.contains("# Displacement response for II station ABKT"));

        let sensor = fs::read_to_string(out.join("local.sensor")).unwrap();
        let row = Sensor::from_line(sensor.lines().next().unwrap()).unwrap();
        assert_eq!(row.inid, 1);
        assert_eq!(row.chanid, 1);
        assert_eq!(row.endtime, ENDTIME_NULL);

        let wfdisc = fs::read_to_string(out.join("local.wfdisc")).unwrap();
        let rows: Vec<Wfdisc> = wfdisc
            .lines()
            .map(|l| Wfdisc::from_line(l).unwrap())
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].nsamp, 10);
        assert_eq!(rows[1].nsamp, 5);
        assert_eq!(rows[0].datatype, host_float_datatype());

        // the waveform file holds the decoded samples in host-endian f32
        let w = fs::read(out.join(&rows[0].dfile)).unwrap();
        assert_eq!(w.len(), 40);
        let first = f32::from_ne_bytes([w[0], w[1], w[2], w[3]]);
        assert_eq!(first, 1.0);
    }

    #[test]
    fn update_mode_preserves_ids_and_rows() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let seed_path = tmp.path().join("test.seed");
        fs::write(&seed_path, test_volume()).unwrap();

        let out = tmp.path().join("css");
        let opts = ConvertOptions {
            dir: out.to_string_lossy().to_string(),
            prefix: "local".to_string(),
            respdir: out.to_string_lossy().to_string(),
            geo_table_dir: None,
            update: true,
            getdata: true,
        };
        convert_to_css(seed_path.to_str().unwrap(), &opts).unwrap();
        convert_to_css(seed_path.to_str().unwrap(), &opts).unwrap();

        let sitechan = fs::read_to_string(out.join("local.sitechan")).unwrap();
        assert_eq!(sitechan.lines().count(), 1);
        let row = Sitechan::from_line(sitechan.lines().next().unwrap()).unwrap();
        assert_eq!(row.chanid, 1);

        let site = fs::read_to_string(out.join("local.site")).unwrap();
        assert_eq!(site.lines().count(), 1);

        let sensor = fs::read_to_string(out.join("local.sensor")).unwrap();
        assert_eq!(sensor.lines().count(), 1);

        let instrument = fs::read_to_string(out.join("local.instrument")).unwrap();
        assert_eq!(instrument.lines().count(), 1);

        let wfdisc = fs::read_to_string(out.join("local.wfdisc")).unwrap();
        assert_eq!(wfdisc.lines().count(), 2);
    }

    #[test]
    fn overwrite_mode_replaces_tables() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let seed_path = tmp.path().join("test.seed");
        fs::write(&seed_path, test_volume()).unwrap();

        let out = tmp.path().join("css");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("local.sitechan"), "garbage that would not parse\n").unwrap();

        let opts = ConvertOptions {
            dir: out.to_string_lossy().to_string(),
            prefix: "local".to_string(),
            respdir: out.to_string_lossy().to_string(),
            geo_table_dir: None,
            update: false,
            getdata: false,
        };
        convert_to_css(seed_path.to_str().unwrap(), &opts).unwrap();

        let sitechan = fs::read_to_string(out.join("local.sitechan")).unwrap();
        assert_eq!(sitechan.lines().count(), 1);
        assert!(!out.join("local.wfdisc").exists());
    }
}
