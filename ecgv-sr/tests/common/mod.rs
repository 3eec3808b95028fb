//! Shared fixtures for ecgv-sr integration tests

#![allow(dead_code)]

pub const ALL_LEADS: [&str; 12] = [
    "DI", "DII", "DIII", "aVR", "aVL", "aVF", "V1", "V2", "V3", "V4", "V5", "V6",
];

/// Low resolution keeps renders fast; 36 dpi is exactly half a pixel per point
pub const TEST_DPI: f32 = 36.0;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Raw-unit payload for a synthetic beat train, `;`-separated
pub fn raw_payload(samples: usize, amplitude: f64) -> String {
    let mut out = String::new();
    for i in 0..samples {
        let phase = (i % 200) as f64 / 200.0;
        let spike = if (0.30..0.34).contains(&phase) { 4.0 } else { 0.0 };
        let value = amplitude * ((phase * std::f64::consts::TAU).sin() * 0.2 + spike);
        out.push_str(&format!("{};", value.round() as i64));
        if i % 50 == 49 {
            out.push_str("\r\n");
        }
    }
    out
}

/// Builder for export documents
pub struct ExamXml {
    pub sample_rate: Option<String>,
    pub sensitivity: Option<String>,
    pub channels: Vec<(String, String)>,
    pub patient_name: Option<String>,
    pub birth_date: Option<String>,
    pub sex: Option<String>,
    pub exam_date: Option<String>,
    pub exam_time: Option<String>,
    pub speed: Option<String>,
    pub heart_rate: Option<String>,
}

impl ExamXml {
    /// Complete exam: 2 s at 250 Hz on all 12 leads
    pub fn complete() -> Self {
        Self {
            sample_rate: Some("250 Hz".to_string()),
            sensitivity: Some("5 uV".to_string()),
            channels: ALL_LEADS
                .iter()
                .map(|name| (name.to_string(), raw_payload(500, 200.0)))
                .collect(),
            patient_name: Some("Maria Silva".to_string()),
            birth_date: Some("12/04/1950".to_string()),
            sex: Some("F".to_string()),
            exam_date: Some("03/09/2020".to_string()),
            exam_time: Some("14:05".to_string()),
            speed: Some("25".to_string()),
            heart_rate: Some("72".to_string()),
        }
    }

    pub fn with_leads(mut self, leads: &[&str]) -> Self {
        self.channels.retain(|(name, _)| leads.contains(&name.as_str()));
        self
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\"?>\n<ECG>\n");

        xml.push_str("  <Paciente>\n");
        push_node(&mut xml, "    ", "Nome", self.patient_name.as_deref());
        push_node(&mut xml, "    ", "DataNascimento", self.birth_date.as_deref());
        push_node(&mut xml, "    ", "Sexo", self.sex.as_deref());
        xml.push_str("  </Paciente>\n");

        xml.push_str("  <Exame>\n");
        push_node(&mut xml, "    ", "Data", self.exam_date.as_deref());
        push_node(&mut xml, "    ", "Hora", self.exam_time.as_deref());
        xml.push_str("  </Exame>\n");

        xml.push_str("  <Registro>\n");
        push_node(&mut xml, "    ", "Velocidade", self.speed.as_deref());
        push_node(&mut xml, "    ", "FrequenciaCardiaca", self.heart_rate.as_deref());
        xml.push_str("  </Registro>\n");

        xml.push_str("  <Registros");
        if let Some(rate) = &self.sample_rate {
            xml.push_str(&format!(" TaxaAmostragem=\"{}\"", rate));
        }
        if let Some(sens) = &self.sensitivity {
            xml.push_str(&format!(" Sensibilidade=\"{}\"", sens));
        }
        xml.push_str(">\n");
        for (name, payload) in &self.channels {
            xml.push_str(&format!(
                "    <Canal Nome=\"{}\">\n      <Amostras>{}</Amostras>\n    </Canal>\n",
                name, payload
            ));
        }
        xml.push_str("  </Registros>\n</ECG>\n");
        xml
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_xml().into_bytes()
    }
}

fn push_node(xml: &mut String, indent: &str, tag: &str, value: Option<&str>) {
    if let Some(value) = value {
        xml.push_str(&format!("{}<{}>{}</{}>\n", indent, tag, value, tag));
    }
}

/// Width and height from a PNG header, checked by a real decoder
pub fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
    assert_eq!(&bytes[..8], &PNG_SIGNATURE, "not a PNG");
    let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
    let reader = decoder.read_info().expect("PNG header should decode");
    let info = reader.info();
    (info.width, info.height)
}
