mod downloaded;
