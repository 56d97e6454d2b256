//! Outbound links for entities, statements and edges

/// Link to the statement evidence page for a hash
pub const DB_URL_HASH: &str = "https://db.indra.bio/statements/from_hash/{stmt_hash}?format=html";

/// Link to all statements between a subject and an object
pub const DB_URL_EDGE: &str = "https://db.indra.bio/statements/from_agents?subject={subj_id}@{subj_ns}&object={obj_id}@{obj_ns}&ev_limit={ev_limit}&format=html";

/// Link templates and evidence limit used when building results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTemplates {
    pub hash: String,
    pub edge: String,
    pub ev_limit: usize,
}

impl Default for LinkTemplates {
    fn default() -> Self {
        Self {
            hash: DB_URL_HASH.to_string(),
            edge: DB_URL_EDGE.to_string(),
            ev_limit: 10,
        }
    }
}

/// Resolver link for a grounded entity, for the namespaces identifiers.org
/// knows about
pub fn identifiers_url(ns: &str, id: &str) -> Option<String> {
    let url = match ns.to_uppercase().as_str() {
        "HGNC" => format!("https://identifiers.org/hgnc:{}", id),
        "UP" => format!("https://identifiers.org/uniprot:{}", id),
        "FPLX" => format!("https://identifiers.org/fplx:{}", id),
        "MESH" => format!("https://identifiers.org/mesh:{}", id),
        "PUBCHEM" => format!("https://identifiers.org/pubchem.compound:{}", id),
        "CHEMBL" => format!("https://identifiers.org/chembl.compound:{}", id),
        "HMDB" => format!("https://identifiers.org/hmdb:{}", id),
        "DRUGBANK" => format!("https://identifiers.org/drugbank:{}", id),
        "EGID" => format!("https://identifiers.org/ncbigene:{}", id),
        "CHEBI" | "GO" | "HP" | "DOID" | "EFO" => {
            // These identifiers already carry their prefix, e.g. "GO:0008150"
            if id.contains(':') {
                format!("https://identifiers.org/{}", id)
            } else {
                format!("https://identifiers.org/{}:{}", ns.to_lowercase(), id)
            }
        }
        _ => return None,
    };
    Some(url)
}

/// Fill a statement link template
pub fn hash_url(template: &str, stmt_hash: i64, ev_limit: Option<usize>) -> String {
    let mut url = template.replace("{stmt_hash}", &stmt_hash.to_string());
    if let Some(limit) = ev_limit {
        url.push_str(&format!("&ev_limit={}", limit));
    }
    url
}

/// Fill an edge link template
pub fn edge_url(
    template: &str,
    (subj_ns, subj_id): (&str, &str),
    (obj_ns, obj_id): (&str, &str),
    ev_limit: usize,
) -> String {
    template
        .replace("{subj_id}", subj_id)
        .replace("{subj_ns}", subj_ns)
        .replace("{obj_id}", obj_id)
        .replace("{obj_ns}", obj_ns)
        .replace("{ev_limit}", &ev_limit.to_string())
}
