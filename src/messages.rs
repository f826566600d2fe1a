use crate::error::Invalid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    En,
    Es,
}

impl Lang {
    /// Only `en` and `es` are recognised; anything else keeps English.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "es" => Self::Es,
            _ => Self::En,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Msg {
    MissingXliff,
    FileNotFound,
    NoFinalSegments,
    TermsWritten,
    PairsWritten,
    Languages,
    Failed,
    Invalid(Invalid),
    UsageTerms,
    UsageBilingual,
}

#[must_use]
pub fn text(lang: Lang, msg: Msg) -> &'static str {
    match (lang, msg) {
        (Lang::En, Msg::MissingXliff) => "Missing required -xliff <file> argument",
        (Lang::Es, Msg::MissingXliff) => "Falta el argumento obligatorio -xliff <archivo>",
        (Lang::En, Msg::FileNotFound) => "XLIFF file not found: {0}",
        (Lang::Es, Msg::FileNotFound) => "No se encontró el archivo XLIFF: {0}",
        (Lang::En, Msg::NoFinalSegments) => "No final segments with source and target text found",
        (Lang::Es, Msg::NoFinalSegments) => {
            "No se encontraron segmentos finales con texto de origen y destino"
        }
        (Lang::En, Msg::TermsWritten) => "{0} terms written to {1}",
        (Lang::Es, Msg::TermsWritten) => "{0} términos escritos en {1}",
        (Lang::En, Msg::PairsWritten) => "{0} term pairs written to {1}",
        (Lang::Es, Msg::PairsWritten) => "{0} pares de términos escritos en {1}",
        (Lang::En, Msg::Languages) => "Source language: {0}, target language: {1}",
        (Lang::Es, Msg::Languages) => "Idioma de origen: {0}, idioma de destino: {1}",
        (Lang::En, Msg::Failed) => "Extraction failed: {0}",
        (Lang::Es, Msg::Failed) => "La extracción falló: {0}",
        (lang, Msg::Invalid(kind)) => invalid(lang, kind),
        (Lang::En, Msg::UsageTerms) => USAGE_TERMS_EN,
        (Lang::Es, Msg::UsageTerms) => USAGE_TERMS_ES,
        (Lang::En, Msg::UsageBilingual) => USAGE_BILINGUAL_EN,
        (Lang::Es, Msg::UsageBilingual) => USAGE_BILINGUAL_ES,
    }
}

fn invalid(lang: Lang, kind: Invalid) -> &'static str {
    match (lang, kind) {
        (Lang::En, Invalid::MinFrequency) => "Minimum frequency must be an integer of at least 1",
        (Lang::Es, Invalid::MinFrequency) => {
            "La frecuencia mínima debe ser un entero mayor o igual que 1"
        }
        (Lang::En, Invalid::MaxScore) => "Maximum score must be greater than 0",
        (Lang::Es, Invalid::MaxScore) => "La puntuación máxima debe ser mayor que 0",
        (Lang::En, Invalid::MaxTermLength) => {
            "Maximum term length must be an integer of at least 1"
        }
        (Lang::Es, Invalid::MaxTermLength) => {
            "La longitud máxima de término debe ser un entero mayor o igual que 1"
        }
        (Lang::En, Invalid::FuzzySimilarity) => "Fuzzy similarity must be between 0 and 1",
        (Lang::Es, Invalid::FuzzySimilarity) => "La similitud difusa debe estar entre 0 y 1",
        (Lang::En, Invalid::MinCoOccurrence) => {
            "Minimum co-occurrence must be an integer of at least 1"
        }
        (Lang::Es, Invalid::MinCoOccurrence) => {
            "La coocurrencia mínima debe ser un entero mayor o igual que 1"
        }
        (Lang::En, Invalid::MaxPairs) => "Maximum pairs must not be negative",
        (Lang::Es, Invalid::MaxPairs) => "El número máximo de pares no puede ser negativo",
        (Lang::En, Invalid::CoOccurrenceRatio) => {
            "Minimum co-occurrence ratio must be between 0 and 1"
        }
        (Lang::Es, Invalid::CoOccurrenceRatio) => {
            "La proporción mínima de coocurrencia debe estar entre 0 y 1"
        }
    }
}

const USAGE_TERMS_EN: &str = "\
Usage:

  term-extractor -xliff xliffFile [-output csvFile] [-minFreq n] [-maxScore s]
                 [-maxLength n] [-relevant] [-config toml] [-stopwords json]
                 [-lang en|es] [-debug] [-version] [-help]

Where:

  -xliff:     XLIFF 2.x document to analyse
  -output:    (optional) CSV file to write; default <xliffFile>.csv
  -minFreq:   (optional) minimum term frequency; default 3
  -maxScore:  (optional) maximum YAKE score; default 10.0
  -maxLength: (optional) maximum words per term; default 3
  -relevant:  (optional) keep only relevant terms
  -config:    (optional) configuration file; default term-extractor.toml
  -stopwords: (optional) JSON stopword table; default built-in lists
  -lang:      (optional) message language
  -debug:     (optional) verbose diagnostics
";

const USAGE_TERMS_ES: &str = "\
Uso:

  term-extractor -xliff archivoXliff [-output archivoCsv] [-minFreq n] [-maxScore s]
                 [-maxLength n] [-relevant] [-config toml] [-stopwords json]
                 [-lang en|es] [-debug] [-version] [-help]

Donde:

  -xliff:     documento XLIFF 2.x a analizar
  -output:    (opcional) archivo CSV de salida; por defecto <archivoXliff>.csv
  -minFreq:   (opcional) frecuencia mínima de término; por defecto 3
  -maxScore:  (opcional) puntuación YAKE máxima; por defecto 10.0
  -maxLength: (opcional) máximo de palabras por término; por defecto 3
  -relevant:  (opcional) conservar solo términos relevantes
  -config:    (opcional) archivo de configuración; por defecto term-extractor.toml
  -stopwords: (opcional) tabla JSON de palabras vacías; por defecto las listas internas
  -lang:      (opcional) idioma de los mensajes
  -debug:     (opcional) diagnóstico detallado
";

const USAGE_BILINGUAL_EN: &str = "\
Usage:

  bilingual-extractor -xliff xliffFile [-output csvFile] [-minFreq n] [-maxScore s]
                      [-maxLength n] [-relevant] [-minCoOccurrence n] [-maxPairs n]
                      [-minCoOccurrenceRatio r] [-config toml] [-stopwords json]
                      [-lang en|es] [-debug] [-version] [-help]

Where:

  -xliff:                XLIFF 2.x document with final segments
  -output:               (optional) CSV file to write; default <name>_bilingual.csv
  -minFreq:              (optional) minimum term frequency; default 3
  -maxScore:             (optional) maximum YAKE score; default 10.0
  -maxLength:            (optional) maximum words per term; default 3
  -relevant:             (optional) keep only relevant terms
  -minCoOccurrence:      (optional) minimum shared segments per pair; default 1
  -maxPairs:             (optional) pairs per term, 0 = unlimited; default 0
  -minCoOccurrenceRatio: (optional) minimum shared/frequency ratio; default 0.70
  -config:               (optional) configuration file; default term-extractor.toml
  -stopwords:            (optional) JSON stopword table; default built-in lists
  -lang:                 (optional) message language
  -debug:                (optional) verbose diagnostics
";

const USAGE_BILINGUAL_ES: &str = "\
Uso:

  bilingual-extractor -xliff archivoXliff [-output archivoCsv] [-minFreq n] [-maxScore s]
                      [-maxLength n] [-relevant] [-minCoOccurrence n] [-maxPairs n]
                      [-minCoOccurrenceRatio r] [-config toml] [-stopwords json]
                      [-lang en|es] [-debug] [-version] [-help]

Donde:

  -xliff:                documento XLIFF 2.x con segmentos finales
  -output:               (opcional) archivo CSV de salida; por defecto <nombre>_bilingual.csv
  -minFreq:              (opcional) frecuencia mínima de término; por defecto 3
  -maxScore:             (opcional) puntuación YAKE máxima; por defecto 10.0
  -maxLength:            (opcional) máximo de palabras por término; por defecto 3
  -relevant:             (opcional) conservar solo términos relevantes
  -minCoOccurrence:      (opcional) mínimo de segmentos compartidos por par; por defecto 1
  -maxPairs:             (opcional) pares por término, 0 = sin límite; por defecto 0
  -minCoOccurrenceRatio: (opcional) proporción mínima compartidos/frecuencia; por defecto 0.70
  -config:               (opcional) archivo de configuración; por defecto term-extractor.toml
  -stopwords:            (opcional) tabla JSON de palabras vacías; por defecto las listas internas
  -lang:                 (opcional) idioma de los mensajes
  -debug:                (opcional) diagnóstico detallado
";

/// Message with `{0}`, `{1}`, ... replaced by `args`.
#[must_use]
pub fn format(lang: Lang, msg: Msg, args: &[&str]) -> String {
    let mut out = text(lang, msg).to_string();
    for (i, a) in args.iter().enumerate() {
        out = out.replace(&format!("{{{i}}}"), a);
    }
    out
}
