//! Locale keyword normalization.
//!
//! Field signals arrive in whatever language the page was authored in.
//! Before any rule matching happens, recognized source-language phrases are
//! rewritten to the canonical English tokens the rule tables key on
//! ("vorname" becomes "firstname", "почта" becomes "email"). Every
//! dictionary is an ordered phrase table with longer phrases ahead of any
//! shorter phrase they contain, so "nom de famille" is consumed before the
//! bare "nom" can corrupt it.
//!
//! Normalization is a pure function. Input is expected to be lowercased by
//! the caller; a phrase table that matches nothing is a no-op.

use std::borrow::Cow;

/// One per-language phrase table, optionally gated by a script test that
/// lets obviously inapplicable dictionaries be skipped cheaply.
struct Dictionary {
    language: &'static str,
    script_gate: Option<fn(&str) -> bool>,
    entries: &'static [(&'static str, &'static str)],
}

fn has_cyrillic(text: &str) -> bool {
    text.chars().any(|c| ('\u{0400}'..='\u{04FF}').contains(&c))
}

fn has_cjk(text: &str) -> bool {
    text.chars().any(|c| {
        ('\u{3040}'..='\u{30FF}').contains(&c) // hiragana + katakana
            || ('\u{4E00}'..='\u{9FFF}').contains(&c) // unified ideographs
    })
}

const GERMAN: &[(&str, &str)] = &[
    ("e-mail-adresse", "email"),
    ("telefonnummer", "phone"),
    ("postleitzahl", "zip"),
    ("emailadresse", "email"),
    ("benutzername", "username"),
    ("geburtsdatum", "birthdate"),
    ("familienname", "lastname"),
    ("hausnummer", "housenumber"),
    ("geburtstag", "birthdate"),
    ("geschlecht", "gender"),
    ("nachname", "lastname"),
    ("passwort", "password"),
    ("vorname", "firstname"),
    ("strasse", "street"),
    ("straße", "street"),
    ("telefon", "phone"),
    ("anrede", "salutation"),
    ("firma", "company"),
    ("stadt", "city"),
    ("alter", "age"),
    ("land", "country"),
    ("plz", "zip"),
    ("ort", "city"),
];

const FRENCH: &[(&str, &str)] = &[
    ("adresse électronique", "email"),
    ("date de naissance", "birthdate"),
    ("nom d'utilisateur", "username"),
    ("nom de famille", "lastname"),
    ("adresse e-mail", "email"),
    ("mot de passe", "password"),
    ("code postal", "zip"),
    ("entreprise", "company"),
    ("téléphone", "phone"),
    ("telephone", "phone"),
    ("courriel", "email"),
    ("société", "company"),
    ("prénom", "firstname"),
    ("prenom", "firstname"),
    ("ville", "city"),
    ("pays", "country"),
    ("rue", "street"),
    ("nom", "name"),
];

const SPANISH: &[(&str, &str)] = &[
    ("fecha de nacimiento", "birthdate"),
    ("correo electrónico", "email"),
    ("nombre de usuario", "username"),
    ("nombre completo", "fullname"),
    ("código postal", "zip"),
    ("codigo postal", "zip"),
    ("contraseña", "password"),
    ("dirección", "address"),
    ("direccion", "address"),
    ("apellidos", "lastname"),
    ("apellido", "lastname"),
    ("teléfono", "phone"),
    ("telefono", "phone"),
    ("empresa", "company"),
    ("nombre", "firstname"),
    ("correo", "email"),
    ("ciudad", "city"),
    ("calle", "street"),
    ("país", "country"),
    ("pais", "country"),
    ("edad", "age"),
];

const PORTUGUESE: &[(&str, &str)] = &[
    ("data de nascimento", "birthdate"),
    ("endereço de email", "email"),
    ("nome de usuário", "username"),
    ("nome completo", "fullname"),
    ("código postal", "zip"),
    ("sobrenome", "lastname"),
    ("endereço", "address"),
    ("telefone", "phone"),
    ("empresa", "company"),
    ("cidade", "city"),
    ("senha", "password"),
    ("idade", "age"),
    ("nome", "firstname"),
    ("país", "country"),
    ("cep", "zip"),
];

const ITALIAN: &[(&str, &str)] = &[
    ("data di nascita", "birthdate"),
    ("indirizzo email", "email"),
    ("codice postale", "zip"),
    ("nome utente", "username"),
    ("indirizzo", "address"),
    ("cognome", "lastname"),
    ("telefono", "phone"),
    ("azienda", "company"),
    ("città", "city"),
    ("citta", "city"),
    ("paese", "country"),
    ("nome", "firstname"),
    ("età", "age"),
];

const DUTCH: &[(&str, &str)] = &[
    ("gebruikersnaam", "username"),
    ("telefoonnummer", "phone"),
    ("geboortedatum", "birthdate"),
    ("achternaam", "lastname"),
    ("wachtwoord", "password"),
    ("woonplaats", "city"),
    ("voornaam", "firstname"),
    ("geslacht", "gender"),
    ("leeftijd", "age"),
    ("telefoon", "phone"),
    ("postcode", "zip"),
    ("bedrijf", "company"),
    ("plaats", "city"),
    ("straat", "street"),
    ("naam", "name"),
    ("land", "country"),
];

const POLISH: &[(&str, &str)] = &[
    ("nazwa użytkownika", "username"),
    ("data urodzenia", "birthdate"),
    ("kod pocztowy", "zip"),
    ("adres e-mail", "email"),
    ("nazwisko", "lastname"),
    ("telefon", "phone"),
    ("miasto", "city"),
    ("hasło", "password"),
    ("haslo", "password"),
    ("ulica", "street"),
    ("firma", "company"),
    ("adres", "address"),
    ("imię", "firstname"),
    ("imie", "firstname"),
    ("wiek", "age"),
    ("kraj", "country"),
    ("płeć", "gender"),
];

const RUSSIAN: &[(&str, &str)] = &[
    ("адрес электронной почты", "email"),
    ("электронная почта", "email"),
    ("почтовый индекс", "zip"),
    ("имя пользователя", "username"),
    ("дата рождения", "birthdate"),
    ("отчество", "middlename"),
    ("фамилия", "lastname"),
    ("телефон", "phone"),
    ("компания", "company"),
    ("возраст", "age"),
    ("пароль", "password"),
    ("индекс", "zip"),
    ("страна", "country"),
    ("почта", "email"),
    ("город", "city"),
    ("улица", "street"),
    ("имя", "firstname"),
    ("пол", "gender"),
];

const JAPANESE: &[(&str, &str)] = &[
    ("メールアドレス", "email"),
    ("ユーザー名", "username"),
    ("パスワード", "password"),
    ("電子メール", "email"),
    ("生年月日", "birthdate"),
    ("電話番号", "phone"),
    ("郵便番号", "zip"),
    ("市区町村", "city"),
    ("会社名", "company"),
    ("お名前", "name"),
    ("メール", "email"),
    ("名前", "name"),
    ("氏名", "fullname"),
    ("住所", "address"),
    ("電話", "phone"),
    ("会社", "company"),
    ("年齢", "age"),
    ("性別", "gender"),
    ("姓", "lastname"),
    ("名", "firstname"),
    ("国", "country"),
];

const CHINESE: &[(&str, &str)] = &[
    ("电子邮件", "email"),
    ("电子邮箱", "email"),
    ("出生日期", "birthdate"),
    ("电话号码", "phone"),
    ("邮政编码", "zip"),
    ("用户名", "username"),
    ("姓名", "fullname"),
    ("姓氏", "lastname"),
    ("名字", "firstname"),
    ("邮箱", "email"),
    ("邮编", "zip"),
    ("城市", "city"),
    ("国家", "country"),
    ("公司", "company"),
    ("密码", "password"),
    ("地址", "address"),
    ("年龄", "age"),
    ("性别", "gender"),
    ("电话", "phone"),
];

const DICTIONARIES: &[Dictionary] = &[
    Dictionary { language: "de", script_gate: None, entries: GERMAN },
    Dictionary { language: "fr", script_gate: None, entries: FRENCH },
    Dictionary { language: "es", script_gate: None, entries: SPANISH },
    Dictionary { language: "pt", script_gate: None, entries: PORTUGUESE },
    Dictionary { language: "it", script_gate: None, entries: ITALIAN },
    Dictionary { language: "nl", script_gate: None, entries: DUTCH },
    Dictionary { language: "pl", script_gate: None, entries: POLISH },
    Dictionary { language: "ru", script_gate: Some(has_cyrillic), entries: RUSSIAN },
    Dictionary { language: "ja", script_gate: Some(has_cjk), entries: JAPANESE },
    Dictionary { language: "zh", script_gate: Some(has_cjk), entries: CHINESE },
];

/// Languages with a shipped phrase table, in evaluation order.
pub fn supported_languages() -> Vec<&'static str> {
    DICTIONARIES.iter().map(|d| d.language).collect()
}

/// Rewrites every recognized source-language phrase in `text` to its
/// canonical English token. All other characters pass through untouched;
/// already-English text comes back borrowed.
pub fn normalize(text: &str) -> Cow<'_, str> {
    if text.is_empty() {
        return Cow::Borrowed(text);
    }
    let mut current: Option<String> = None;
    for dictionary in DICTIONARIES {
        let haystack = current.as_deref().unwrap_or(text);
        if let Some(gate) = dictionary.script_gate
            && !gate(haystack)
        {
            continue;
        }
        if !dictionary.entries.iter().any(|(phrase, _)| haystack.contains(phrase)) {
            continue;
        }
        let mut replaced = haystack.to_string();
        for (phrase, token) in dictionary.entries {
            if replaced.contains(phrase) {
                replaced = replaced.replace(phrase, token);
            }
        }
        current = Some(replaced);
    }
    match current {
        Some(owned) => Cow::Owned(owned),
        None => Cow::Borrowed(text),
    }
}
