use syn::{Field, FieldsNamed, Ident, Type, Visibility};

pub(crate) fn has_field_named(fields: &FieldsNamed, name: &Ident) -> bool {
    fields
        .named
        .iter()
        .any(|f| f.ident.as_ref().map(|i| i == name).unwrap_or(false))
}

/// 确保具名字段结构体包含指定字段；缺失时追加到末尾，保留既有顺序
pub(crate) fn ensure_field(fields: &mut FieldsNamed, vis: &Visibility, name: &Ident, ty: &Type) {
    if has_field_named(fields, name) {
        return;
    }
    let field: Field = syn::parse_quote! { #vis #name: #ty };
    fields.named.push(field);
}
