//! Light textual handling of ProForma sequences. All real parsing is done by rustyms, this only
//! splits the text into pieces for display and applies simple textual rewrites.

const CARBAMIDOMETHYL: &str = "[Carbamidomethyl]";

/// Walk the sequence and call `f` for every character with the bracket depth at that character.
fn walk(text: &str, mut f: impl FnMut(usize, char, usize)) {
    let mut depth = 0_usize;
    for (index, c) in text.char_indices() {
        match c {
            '[' | '{' | '<' => {
                f(index, c, depth);
                depth += 1;
            }
            ']' | '}' | '>' => {
                depth = depth.saturating_sub(1);
                f(index, c, depth);
            }
            _ => f(index, c, depth),
        }
    }
}

/// Split off the charge part (`/2`, `/2[+2Na+]`) if present.
pub fn split_charge(text: &str) -> (&str, Option<&str>) {
    let mut split = None;
    let bytes = text.as_bytes();
    walk(text, |index, c, depth| {
        // `//` is a cross-link separator, not a charge
        if split.is_none()
            && depth == 0
            && c == '/'
            && bytes.get(index + 1) != Some(&b'/')
            && (index == 0 || bytes[index - 1] != b'/')
        {
            split = Some(index);
        }
    });
    split.map_or((text, None), |index| {
        (&text[..index], Some(&text[index + 1..]))
    })
}

/// Adducts are written as a bracketed list of charge carriers after the charge, `/2[+2Na+]`.
pub fn has_adducts(text: &str) -> bool {
    split_charge(text).1.is_some_and(|charge| charge.contains('['))
}

/// The bare residue letters, as used in file names.
pub fn stripped_sequence(text: &str) -> String {
    let (sequence, _) = split_charge(text);
    let mut output = String::new();
    walk(sequence, |_, c, depth| {
        if depth == 0 && c.is_ascii_alphabetic() {
            output.push(c.to_ascii_uppercase());
        }
    });
    output
}

/// Split the sequence into one token per residue, every token being the residue with all
/// its annotations. Anything in front of the first residue (global, labile, N terminal
/// modifications) is part of the first token, C terminal modifications are part of the last.
pub fn residue_tokens(text: &str) -> Vec<String> {
    let (sequence, _) = split_charge(text);
    let mut tokens: Vec<String> = Vec::new();
    let mut prefix = String::new();
    walk(sequence, |_, c, depth| {
        if depth == 0 && c.is_ascii_alphabetic() {
            tokens.push(std::mem::take(&mut prefix));
            if let Some(last) = tokens.last_mut() {
                last.push(c);
            }
        } else if let Some(last) = tokens.last_mut() {
            last.push(c);
        } else {
            prefix.push(c);
        }
    });
    tokens
}

/// The symbols for the residue column. Falls back to the given plain residues if the textual
/// split does not line up with the parsed peptide.
pub fn residue_symbols(text: &str, residues: &[String]) -> Vec<String> {
    let tokens = residue_tokens(text);
    if tokens.len() == residues.len() {
        tokens
    } else {
        log::debug!(
            "Residue split of '{text}' gave {} tokens for {} residues, using plain residues",
            tokens.len(),
            residues.len()
        );
        residues.to_vec()
    }
}

/// Place a static carbamidomethyl on every cysteine.
pub fn add_carbamidomethyl(text: &str) -> String {
    let (sequence, charge) = split_charge(text);
    let mut output = String::with_capacity(text.len() + CARBAMIDOMETHYL.len());
    walk(sequence, |_, c, depth| {
        output.push(c);
        if depth == 0 && c.eq_ignore_ascii_case(&'C') {
            output.push_str(CARBAMIDOMETHYL);
        }
    });
    if let Some(charge) = charge {
        output.push('/');
        output.push_str(charge);
    }
    output
}
