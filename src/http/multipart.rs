//! # Decodificación de multipart/form-data
//! src/http/multipart.rs
//!
//! Decoder mínimo de `multipart/form-data` (RFC 7578) para el endpoint de
//! upload. Trabaja a nivel de bytes: los campos de texto se validan como
//! UTF-8, el contenido de los archivos se conserva crudo.
//!
//! ```text
//! --BOUNDARY\r\n
//! Content-Disposition: form-data; name="userId"\r\n
//! \r\n
//! user-1\r\n
//! --BOUNDARY\r\n
//! Content-Disposition: form-data; name="file"; filename="a.jpg"\r\n
//! Content-Type: image/jpeg\r\n
//! \r\n
//! <bytes>\r\n
//! --BOUNDARY--\r\n
//! ```

use crate::http::request::find_bytes;
use std::collections::HashMap;

/// Archivo subido dentro de un form multipart
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    /// Nombre del archivo según el cliente
    pub file_name: String,

    /// Content-Type declarado de la parte, si vino
    pub content_type: Option<String>,

    /// Bytes crudos del archivo
    pub data: Vec<u8>,
}

/// Form multipart decodificado: campos de texto y archivos por nombre
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, FilePart>,
}

impl MultipartForm {
    /// Obtiene un campo de texto por nombre
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    /// Obtiene un archivo por nombre de campo
    pub fn file(&self, name: &str) -> Option<&FilePart> {
        self.files.get(name)
    }
}

/// Errores de decodificación multipart
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartError {
    /// El Content-Type no es multipart/form-data
    NotMultipart,

    /// El Content-Type no declara boundary
    MissingBoundary,

    /// Una parte no tiene el formato esperado
    MalformedPart,

    /// Un campo de texto no es UTF-8 válido
    InvalidFieldEncoding(String),
}

impl std::fmt::Display for MultipartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MultipartError::NotMultipart => write!(f, "Content-Type is not multipart/form-data"),
            MultipartError::MissingBoundary => write!(f, "Missing multipart boundary"),
            MultipartError::MalformedPart => write!(f, "Malformed multipart section"),
            MultipartError::InvalidFieldEncoding(name) => {
                write!(f, "Field is not valid UTF-8: {}", name)
            }
        }
    }
}

impl std::error::Error for MultipartError {}

/// Decodifica un body multipart/form-data
///
/// `content_type` es el valor completo del header Content-Type, con el
/// boundary incluido.
pub fn parse_multipart(content_type: &str, body: &[u8]) -> Result<MultipartForm, MultipartError> {
    if !content_type
        .to_ascii_lowercase()
        .starts_with("multipart/form-data")
    {
        return Err(MultipartError::NotMultipart);
    }

    let boundary = extract_boundary(content_type).ok_or(MultipartError::MissingBoundary)?;
    let delimiter = format!("--{}", boundary);
    let delimiter_bytes = delimiter.as_bytes();

    let mut form = MultipartForm::default();

    // Avanzar de delimitador en delimitador
    let mut rest = match find_bytes(body, delimiter_bytes) {
        Some(pos) => &body[pos + delimiter_bytes.len()..],
        None => return Err(MultipartError::MalformedPart),
    };

    loop {
        // Tras el delimitador viene "\r\n" (sigue una parte) o "--" (fin)
        if rest.starts_with(b"--") {
            break;
        }
        let section = rest.strip_prefix(b"\r\n").unwrap_or(rest);

        // La parte termina en el próximo delimitador
        let part_end =
            find_bytes(section, delimiter_bytes).ok_or(MultipartError::MalformedPart)?;
        parse_part(&section[..part_end], &mut form)?;

        rest = &section[part_end + delimiter_bytes.len()..];
    }

    Ok(form)
}

/// Extrae el boundary del header Content-Type
fn extract_boundary(content_type: &str) -> Option<String> {
    for param in content_type.split(';') {
        let param = param.trim();
        if let Some(value) = param.strip_prefix("boundary=") {
            let value = value.trim_matches('"');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Procesa una parte individual: headers propios + contenido
fn parse_part(part: &[u8], form: &mut MultipartForm) -> Result<(), MultipartError> {
    let header_end = find_bytes(part, b"\r\n\r\n").ok_or(MultipartError::MalformedPart)?;

    let headers = std::str::from_utf8(&part[..header_end])
        .map_err(|_| MultipartError::MalformedPart)?;

    // El contenido termina en el \r\n previo al delimitador
    let content = &part[header_end + 4..];
    let content = content.strip_suffix(b"\r\n").unwrap_or(content);

    let mut name = None;
    let mut file_name = None;
    let mut content_type = None;

    for line in headers.split("\r\n") {
        let lower = line.to_ascii_lowercase();
        if lower.starts_with("content-disposition:") {
            name = extract_disposition_param(line, "name");
            file_name = extract_disposition_param(line, "filename");
        } else if lower.starts_with("content-type:") {
            content_type = line.splitn(2, ':').nth(1).map(|v| v.trim().to_string());
        }
    }

    let name = name.ok_or(MultipartError::MalformedPart)?;

    match file_name {
        Some(file_name) => {
            form.files.insert(
                name,
                FilePart {
                    file_name,
                    content_type,
                    data: content.to_vec(),
                },
            );
        }
        None => {
            let value = std::str::from_utf8(content)
                .map_err(|_| MultipartError::InvalidFieldEncoding(name.clone()))?;
            form.fields.insert(name, value.to_string());
        }
    }

    Ok(())
}

/// Extrae un parámetro (`name="..."`) del header Content-Disposition
fn extract_disposition_param(header: &str, param: &str) -> Option<String> {
    for piece in header.split(';') {
        let piece = piece.trim();
        let prefix = format!("{}=", param);
        if let Some(value) = piece.strip_prefix(&prefix) {
            return Some(value.trim_matches('"').to_string());
        }
    }
    None
}
